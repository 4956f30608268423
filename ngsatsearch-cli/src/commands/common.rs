//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use ngsatsearch::config::ConfigFile;
use ngsatsearch::{
    CatalogConfig, CatalogResponse, Credentials, ResponseStatus, SatelliteCatalog, ServiceKind,
};
use serde::Serialize;
use tracing::info;

use crate::error::CliError;

/// Flags accepted by every subcommand.
#[derive(Debug, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub service: Option<ServiceKind>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub download_dir: Option<PathBuf>,
}

/// Resolve catalog settings from CLI args and the config file.
///
/// Command-line flags take precedence, then the config file, then defaults.
pub fn resolve_config(args: &GlobalArgs) -> Result<CatalogConfig, CliError> {
    let file = match &args.config {
        Some(path) if !path.exists() => {
            return Err(CliError::Args(format!(
                "config file {} does not exist",
                path.display()
            )))
        }
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(merge(args, &file))
}

fn merge(args: &GlobalArgs, file: &ConfigFile) -> CatalogConfig {
    let mut config = CatalogConfig::from(file);

    if let Some(service) = args.service {
        config = config.with_service(service);
    }
    if let Some(directory) = &args.download_dir {
        config = config.with_download_directory(directory.clone());
    }

    let username = args
        .username
        .clone()
        .or_else(|| file.credentials.username.clone());
    let password = args
        .password
        .clone()
        .or_else(|| file.credentials.password.clone());
    if let (Some(username), Some(password)) = (username, password) {
        config = config.with_credentials(Credentials::new(username, password));
    }

    config
}

/// Build the catalog for the resolved configuration.
pub fn open_catalog(args: &GlobalArgs) -> Result<SatelliteCatalog, CliError> {
    let config = resolve_config(args)?;
    info!(service = %config.service, "opening catalog");
    Ok(SatelliteCatalog::new(config)?)
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{}'", value))
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Process exit code for one envelope: 0 ok, 1 error, 2 partial.
pub fn exit_code<T>(response: &CatalogResponse<T>) -> i32 {
    i32::from(response.code)
}

/// Exit code for several envelopes: any error wins over partial.
pub fn combined_exit_code<'a>(statuses: impl IntoIterator<Item = &'a ResponseStatus>) -> i32 {
    statuses.into_iter().fold(0, |code, status| match status {
        ResponseStatus::Error => 1,
        ResponseStatus::Partial if code == 0 => 2,
        _ => code,
    })
}
