//! CLI error handling with user-friendly messages.
//!
//! Errors here stop the command before a catalog envelope could be printed:
//! bad arguments, unreadable configuration, a backend that cannot be built.

use std::fmt;
use std::process;

use ngsatsearch::config::ConfigFileError;
use ngsatsearch::{CatalogError, ErrorKind};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be used
    Config(ConfigFileError),
    /// Invalid combination of arguments
    Args(String),
    /// Failed to build the catalog
    Catalog(CatalogError),
    /// Failed to render the response
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Catalog(e) = self {
            if e.kind() == ErrorKind::Authorization {
                eprintln!();
                eprintln!("Provide credentials with --username/--password,");
                eprintln!("NGSATSEARCH_USERNAME/NGSATSEARCH_PASSWORD or the");
                eprintln!("[credentials] section of the config file.");
            }
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Args(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::Catalog(e) => write!(f, "Failed to open catalog: {}", e),
            CliError::Output(e) => write!(f, "Failed to render response: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
