//! The [`SatelliteCatalog`] facade.
//!
//! One entry point over the active backend. Every operation returns a
//! [`CatalogResponse`] envelope: backend errors are caught here, logged and
//! mapped onto a fixed user-facing message, so no [`CatalogError`] crosses
//! this boundary.
//!
//! ```ignore
//! use ngsatsearch::{CatalogConfig, SatelliteCatalog, ServiceKind};
//!
//! let catalog = SatelliteCatalog::new(CatalogConfig::new(ServiceKind::GoogleCloud))?;
//! let response = catalog.metadata("LC08_L1TP_174021_20190623_20190704_01_T1");
//! println!("{}", serde_json::to_string(&response)?);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::condition::{Polygon, SearchCondition, SearchOption, TimeRange};
use crate::config::CatalogConfig;
use crate::download::{DownloadOutcome, DownloadRequest, DownloadStatus};
use crate::error::{CatalogError, CatalogResult, ErrorKind};
use crate::http::{Credentials, HttpClient, ReqwestClient};
use crate::platform::{platform_names, Platform};
use crate::provider::{Backend, Provider, ServiceKind};
use crate::scene::SceneIdentifier;

const AUTHORIZATION_MESSAGE: &str = "Authorization error. Check credentials";
const INVALID_RESULTS_MESSAGE: &str = "Invalid results obtained. Break. Possible reason: too much points in the given area of interest. Make sure it contains less than 10 points";
const INVALID_METADATA_MESSAGE: &str = "Invalid metadata obtained from the service";
const INVALID_POLYGON_MESSAGE: &str =
    "Invalid WKT Polygon. Must be like POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))";
const INVALID_IDENTIFIER_MESSAGE: &str =
    "Invalid identifier. It does not follow a known scene naming convention";
const NOT_FOUND_MESSAGE: &str = "Dataset with given Identifier not found";
const UNAVAILABLE_MESSAGE: &str =
    "Service is not responding. It may be caused e.g. by a Google Cloud temporary ban";

/// Envelope status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    /// Multi-asset download where only some assets are present.
    Partial,
    Error,
}

/// Uniform result of every catalog operation.
///
/// `code` is 0 on success, 1 on failure and 2 on partial success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogResponse<T> {
    pub status: ResponseStatus,
    pub code: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> CatalogResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: ResponseStatus::Ok,
            code: 0,
            message: "OK".to_string(),
            error_kind: None,
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            code: 1,
            message: message.into(),
            error_kind: None,
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }
}

impl From<DownloadOutcome> for CatalogResponse<Vec<String>> {
    fn from(outcome: DownloadOutcome) -> Self {
        let status = match outcome.status {
            DownloadStatus::Ok => ResponseStatus::Ok,
            DownloadStatus::Partial => ResponseStatus::Partial,
            DownloadStatus::Error => ResponseStatus::Error,
        };
        Self {
            status,
            code: outcome.code,
            message: outcome.message,
            error_kind: None,
            data: (status != ResponseStatus::Error).then_some(outcome.files),
        }
    }
}

/// Which facade operation an error came from.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Search,
    Download,
    Metadata,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::Download => "download",
            Operation::Metadata => "metadata",
        }
    }
}

/// Search, download and metadata over one active backend.
///
/// Generic over the HTTP client so tests can script the network. The client
/// is shared with the backend and survives [`change_service`](Self::change_service).
pub struct SatelliteCatalog<C: HttpClient = ReqwestClient> {
    http_client: Arc<C>,
    backend: Backend<Arc<C>>,
    download_directory: PathBuf,
}

impl SatelliteCatalog<ReqwestClient> {
    /// Builds a catalog with a reqwest client using the configured timeouts.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built, the download directory cannot
    /// be created, or the backend rejects the credentials.
    pub fn new(config: CatalogConfig) -> CatalogResult<Self> {
        let client = ReqwestClient::with_settings(config.http)?;
        Self::with_client(config, client)
    }
}

impl<C: HttpClient> SatelliteCatalog<C> {
    /// Builds a catalog over an arbitrary HTTP client.
    pub fn with_client(config: CatalogConfig, http_client: C) -> CatalogResult<Self> {
        create_directory(&config.download_directory)?;

        let http_client = Arc::new(http_client);
        let backend = Backend::connect(
            config.service,
            Arc::clone(&http_client),
            config.credentials.as_ref(),
        )?;
        info!(service = %config.service, directory = %config.download_directory.display(), "catalog ready");

        Ok(Self {
            http_client,
            backend,
            download_directory: config.download_directory,
        })
    }

    pub fn service(&self) -> ServiceKind {
        self.backend.service()
    }

    pub fn download_directory(&self) -> &Path {
        &self.download_directory
    }

    /// Platforms and options of the active backend.
    pub fn available_platforms(&self) -> &'static [Platform] {
        self.backend.platforms()
    }

    /// Switches to another backend.
    ///
    /// The session backend logs in again. On failure the current backend is
    /// kept.
    pub fn change_service(
        &mut self,
        service: ServiceKind,
        credentials: Option<&Credentials>,
    ) -> CatalogResult<()> {
        self.backend = Backend::connect(service, Arc::clone(&self.http_client), credentials)?;
        info!(service = %service, "service changed");
        Ok(())
    }

    /// Points downloads at `directory`, creating it if missing.
    pub fn change_download_directory(&mut self, directory: impl Into<PathBuf>) -> CatalogResult<()> {
        let directory = directory.into();
        create_directory(&directory)?;
        self.download_directory = directory;
        Ok(())
    }

    /// Searches the active backend.
    ///
    /// `region` is a WKT polygon. Dates bound the acquisition time; either
    /// may be omitted.
    pub fn search(
        &self,
        platform: &str,
        region: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        options: &[SearchOption],
    ) -> CatalogResponse<Vec<SceneIdentifier>> {
        let condition = region
            .map(Polygon::from_wkt)
            .transpose()
            .map(|polygon| {
                let condition = SearchCondition::new(platform)
                    .with_time_range(TimeRange::new(start, end))
                    .with_options(options.iter().cloned());
                match polygon {
                    Some(polygon) => condition.with_region(polygon),
                    None => condition,
                }
            });

        match condition {
            Ok(condition) => self.search_condition(&condition),
            Err(e) => self.failure(Operation::Search, e),
        }
    }

    /// Searches with a prepared condition.
    pub fn search_condition(
        &self,
        condition: &SearchCondition,
    ) -> CatalogResponse<Vec<SceneIdentifier>> {
        match self.backend.search(condition) {
            Ok(scenes) => {
                info!(platform = %condition.platform, count = scenes.len(), "search finished");
                CatalogResponse::ok(scenes)
            }
            Err(e) => self.failure(Operation::Search, e),
        }
    }

    /// Downloads one scene into the download directory.
    ///
    /// `data` lists the files present afterwards. A multi-asset download
    /// where only some assets arrived answers with status `partial`.
    pub fn download(
        &self,
        identifier: &str,
        request: &DownloadRequest,
    ) -> CatalogResponse<Vec<String>> {
        let identifier = SceneIdentifier::from(identifier);
        match self
            .backend
            .download(&identifier, request, &self.download_directory)
        {
            Ok(outcome) => {
                info!(
                    identifier = %identifier,
                    status = ?outcome.status,
                    files = outcome.files.len(),
                    skipped = outcome.skipped.len(),
                    "download finished"
                );
                outcome.into()
            }
            Err(e) => self.failure(Operation::Download, e),
        }
    }

    /// Returns the backend's metadata for one scene as text.
    pub fn metadata(&self, identifier: &str) -> CatalogResponse<String> {
        match self.backend.metadata(&SceneIdentifier::from(identifier)) {
            Ok(text) => CatalogResponse::ok(text),
            Err(e) => self.failure(Operation::Metadata, e),
        }
    }

    fn failure<T>(&self, operation: Operation, error: CatalogError) -> CatalogResponse<T> {
        warn!(operation = operation.as_str(), service = %self.service(), error = %error, "operation failed");
        let mut response = CatalogResponse::error(self.user_message(operation, &error));
        response.error_kind = Some(error.kind());
        response
    }

    fn user_message(&self, operation: Operation, error: &CatalogError) -> String {
        let supported = || platform_names(self.available_platforms()).join(", ");
        match error {
            CatalogError::UnsupportedPlatform(_) => {
                format!("Unsupported platform. Supported: {}", supported())
            }
            CatalogError::Authorization(_) => AUTHORIZATION_MESSAGE.to_string(),
            CatalogError::InvalidMetadata(_) => match operation {
                Operation::Search => INVALID_RESULTS_MESSAGE.to_string(),
                Operation::Download | Operation::Metadata => INVALID_METADATA_MESSAGE.to_string(),
            },
            CatalogError::InvalidOption { .. } => format!(
                "Invalid options in request. See supported platforms: {}",
                supported()
            ),
            CatalogError::Query { .. } => format!(
                "Invalid query. Maybe, wrong options in request. See supported platforms: {}",
                supported()
            ),
            CatalogError::InvalidPolygon(_) => INVALID_POLYGON_MESSAGE.to_string(),
            CatalogError::InvalidIdentifier(_) => INVALID_IDENTIFIER_MESSAGE.to_string(),
            CatalogError::DatasetNotFound(_) => NOT_FOUND_MESSAGE.to_string(),
            CatalogError::ServiceUnavailable(_) => UNAVAILABLE_MESSAGE.to_string(),
            CatalogError::Connection(_) | CatalogError::Io { .. } => format!("Error: {}", error),
        }
    }
}

fn create_directory(directory: &Path) -> CatalogResult<()> {
    fs::create_dir_all(directory).map_err(|e| CatalogError::io(directory, e))
}
