//! Platforms command - list platforms and their search options.
//!
//! Reads the static table of the selected service; needs no credentials and
//! makes no request.

use ngsatsearch::CatalogResponse;
use tracing::info;

use super::common::{print_json, resolve_config, GlobalArgs};
use crate::error::CliError;

/// Run the platforms command.
pub fn run(global: &GlobalArgs) -> Result<i32, CliError> {
    let config = resolve_config(global)?;
    let platforms = config.service.platforms();
    info!(service = %config.service, count = platforms.len(), "listing platforms");

    print_json(&CatalogResponse::ok(platforms))?;
    Ok(0)
}
