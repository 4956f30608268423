//! Runtime configuration of a [`SatelliteCatalog`](crate::catalog::SatelliteCatalog).

use std::path::PathBuf;
use std::time::Duration;

use super::settings::{ConfigFile, DEFAULT_DOWNLOAD_DIRECTORY};
use crate::http::{Credentials, HttpSettings};
use crate::provider::ServiceKind;

/// Backend, credentials, download directory and HTTP timeouts.
///
/// # Example
///
/// ```
/// use ngsatsearch::{CatalogConfig, ServiceKind};
///
/// let config = CatalogConfig::new(ServiceKind::GoogleCloud)
///     .with_download_directory("/tmp/scenes")
///     .with_timeout_secs(120);
/// assert_eq!(config.http.timeout.as_secs(), 120);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub service: ServiceKind,
    pub credentials: Option<Credentials>,
    pub download_directory: PathBuf,
    pub http: HttpSettings,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(ServiceKind::Copernicus)
    }
}

impl CatalogConfig {
    pub fn new(service: ServiceKind) -> Self {
        Self {
            service,
            credentials: None,
            download_directory: PathBuf::from(DEFAULT_DOWNLOAD_DIRECTORY),
            http: HttpSettings::default(),
        }
    }

    pub fn with_service(mut self, service: ServiceKind) -> Self {
        self.service = service;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_download_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.download_directory = directory.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.http.timeout = Duration::from_secs(secs);
        self
    }

    pub fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.http.connect_timeout = Duration::from_secs(secs);
        self
    }
}

impl From<&ConfigFile> for CatalogConfig {
    fn from(file: &ConfigFile) -> Self {
        let mut config = CatalogConfig::new(file.catalog.service)
            .with_download_directory(file.catalog.download_directory.clone())
            .with_timeout_secs(file.http.timeout_secs)
            .with_connect_timeout_secs(file.http.connect_timeout_secs);

        if let (Some(username), Some(password)) =
            (&file.credentials.username, &file.credentials.password)
        {
            config = config.with_credentials(Credentials::new(username, password));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.service, ServiceKind::Copernicus);
        assert_eq!(config.download_directory, PathBuf::from("./downloads"));
        assert_eq!(config.http.timeout, Duration::from_secs(300));
        assert_eq!(config.http.connect_timeout, Duration::from_secs(30));
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.catalog.service = ServiceKind::EarthExplorer;
        file.credentials.username = Some("alice".into());
        file.credentials.password = Some("secret".into());
        file.http.timeout_secs = 60;

        let config = CatalogConfig::from(&file);

        assert_eq!(config.service, ServiceKind::EarthExplorer);
        assert_eq!(config.credentials, Some(Credentials::new("alice", "secret")));
        assert_eq!(config.http.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_username_without_password_gives_no_credentials() {
        let mut file = ConfigFile::default();
        file.credentials.username = Some("alice".into());

        assert!(CatalogConfig::from(&file).credentials.is_none());
    }
}
