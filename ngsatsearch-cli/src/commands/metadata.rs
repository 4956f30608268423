//! Metadata command - print the service metadata of one scene.

use super::common::{exit_code, open_catalog, print_json, GlobalArgs};
use crate::error::CliError;

/// Run the metadata command.
pub fn run(global: &GlobalArgs, identifier: &str) -> Result<i32, CliError> {
    let catalog = open_catalog(global)?;
    let response = catalog.metadata(identifier);

    print_json(&response)?;
    Ok(exit_code(&response))
}
