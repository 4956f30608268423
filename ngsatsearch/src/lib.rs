//! NGSatSearch - satellite scene search and download
//!
//! Queries three imagery sources through one contract:
//!
//! - **Copernicus**: OpenSearch catalog (Sentinel-1/2/3), one archive per scene
//! - **EarthExplorer**: session-keyed JSON API (Landsat collections)
//! - **Google Cloud**: public storage buckets, one file per band
//!
//! [`SatelliteCatalog`] is the entry point. Each call returns a
//! [`CatalogResponse`] envelope with a status, a numeric code, a
//! human-readable message and the payload.
//!
//! # Example
//!
//! ```ignore
//! use ngsatsearch::{CatalogConfig, Credentials, SatelliteCatalog, ServiceKind};
//!
//! let config = CatalogConfig::new(ServiceKind::Copernicus)
//!     .with_credentials(Credentials::new("user", "secret"))
//!     .with_download_directory("./scenes");
//! let catalog = SatelliteCatalog::new(config)?;
//!
//! let found = catalog.search(
//!     "Sentinel-2",
//!     Some("POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))"),
//!     None,
//!     None,
//!     &["cloudcoverpercentage=[0 TO 10]".parse()?],
//! );
//! for scene in found.data.unwrap_or_default() {
//!     catalog.download(scene.as_str(), &Default::default());
//! }
//! ```

pub mod catalog;
pub mod condition;
pub mod config;
pub mod download;
pub mod error;
pub mod http;
pub mod logging;
pub mod pagination;
pub mod platform;
pub mod provider;
pub mod scene;

pub use catalog::{CatalogResponse, ResponseStatus, SatelliteCatalog};
pub use condition::{Polygon, SearchCondition, SearchOption, TimeRange};
pub use config::CatalogConfig;
pub use download::{DownloadOutcome, DownloadRequest, DownloadStatus, ProgressCallback};
pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use http::{Credentials, HttpClient, HttpRequest, HttpResponse};
pub use platform::{OptionDomain, Platform};
pub use provider::ServiceKind;
pub use scene::SceneIdentifier;
