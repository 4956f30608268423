//! Settings structs for each configuration section.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;

use crate::http::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use crate::provider::ServiceKind;

/// Default download directory, relative to the working directory.
pub const DEFAULT_DOWNLOAD_DIRECTORY: &str = "./downloads";

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub catalog: CatalogSettings,
    pub credentials: CredentialSettings,
    pub http: HttpFileSettings,
}

/// `[catalog]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Active backend.
    pub service: ServiceKind,
    /// Where downloads are written.
    pub download_directory: PathBuf,
}

/// `[credentials]`
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialSettings {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSettings")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// `[http]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpFileSettings {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            catalog: CatalogSettings {
                service: ServiceKind::Copernicus,
                download_directory: PathBuf::from(DEFAULT_DOWNLOAD_DIRECTORY),
            },
            credentials: CredentialSettings::default(),
            http: HttpFileSettings {
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
        }
    }
}
