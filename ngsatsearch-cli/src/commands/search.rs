//! Search command - list scene identifiers matching a query.

use chrono::{DateTime, Utc};
use ngsatsearch::SearchOption;

use super::common::{exit_code, open_catalog, print_json, GlobalArgs};
use crate::error::CliError;

/// Arguments for the search command.
pub struct SearchArgs {
    pub platform: String,
    pub wkt: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub options: Vec<SearchOption>,
}

/// Run the search command.
pub fn run(global: &GlobalArgs, args: SearchArgs) -> Result<i32, CliError> {
    if let (Some(start), Some(end)) = (args.start, args.end) {
        if start > end {
            return Err(CliError::Args(format!(
                "--start ({}) is after --end ({})",
                start, end
            )));
        }
    }

    let catalog = open_catalog(global)?;
    let response = catalog.search(
        &args.platform,
        args.wkt.as_deref(),
        args.start,
        args.end,
        &args.options,
    );

    print_json(&response)?;
    Ok(exit_code(&response))
}
