//! Satellite imagery backends.
//!
//! Each backend implements [`Provider`] over an [`HttpClient`]:
//!
//! - [`CopernicusProvider`]: OpenSearch catalog with OData downloads
//! - [`EarthExplorerProvider`]: session-keyed JSON inventory API
//! - [`GoogleCloudProvider`]: public object storage, paths derived from identifiers
//!
//! The set is closed; [`Backend`] is the tagged union the catalog holds.
//!
//! ```ignore
//! use ngsatsearch::provider::{Backend, ServiceKind};
//! use ngsatsearch::http::ReqwestClient;
//!
//! let backend = Backend::connect(ServiceKind::GoogleCloud, ReqwestClient::new()?, None)?;
//! let platforms = backend.platforms();
//! ```

mod copernicus;
mod earthexplorer;
mod google_cloud;
mod rules;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::condition::SearchCondition;
use crate::download::{DownloadOutcome, DownloadRequest};
use crate::error::{CatalogError, CatalogResult};
use crate::http::{Credentials, HttpClient};
use crate::platform::Platform;
use crate::scene::SceneIdentifier;

pub use copernicus::CopernicusProvider;
pub use earthexplorer::EarthExplorerProvider;
pub use google_cloud::GoogleCloudProvider;
pub use rules::{infer_platform, IdentifierRule, Marker};

/// The supported imagery sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    Copernicus,
    EarthExplorer,
    GoogleCloud,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 3] = [
        ServiceKind::Copernicus,
        ServiceKind::EarthExplorer,
        ServiceKind::GoogleCloud,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Copernicus => "copernicus",
            ServiceKind::EarthExplorer => "earthexplorer",
            ServiceKind::GoogleCloud => "google_cloud",
        }
    }

    /// Whether the backend needs a username and password.
    pub fn requires_credentials(self) -> bool {
        !matches!(self, ServiceKind::GoogleCloud)
    }

    /// Static platform table of the backend.
    pub fn platforms(self) -> &'static [Platform] {
        match self {
            ServiceKind::Copernicus => copernicus::PLATFORMS,
            ServiceKind::EarthExplorer => earthexplorer::PLATFORMS,
            ServiceKind::GoogleCloud => google_cloud::PLATFORMS,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unsupported service '{}' (expected one of: copernicus, earthexplorer, google_cloud)",
                    s
                )
            })
    }
}

/// Search, download and metadata contract shared by every backend.
///
/// Calls are blocking. Implementations hold no mutable state after
/// construction, so one provider can serve concurrent downloads of distinct
/// scenes.
pub trait Provider: Send + Sync {
    /// Which service this provider talks to.
    fn service(&self) -> ServiceKind;

    /// Platforms and options the backend recognizes.
    fn platforms(&self) -> &'static [Platform];

    /// Returns every scene matching `condition`, in provider order.
    ///
    /// Options are validated before any network call.
    fn search(&self, condition: &SearchCondition) -> CatalogResult<Vec<SceneIdentifier>>;

    /// Downloads a scene into `directory`.
    fn download(
        &self,
        identifier: &SceneIdentifier,
        request: &DownloadRequest,
        directory: &Path,
    ) -> CatalogResult<DownloadOutcome>;

    /// Returns the provider's metadata for a scene as text.
    fn metadata(&self, identifier: &SceneIdentifier) -> CatalogResult<String>;
}

/// The active backend, chosen at construction.
pub enum Backend<C: HttpClient> {
    Copernicus(CopernicusProvider<C>),
    EarthExplorer(EarthExplorerProvider<C>),
    GoogleCloud(GoogleCloudProvider<C>),
}

impl<C: HttpClient> Backend<C> {
    /// Builds the backend for `kind`.
    ///
    /// EarthExplorer logs in here; the other backends make no request.
    pub fn connect(
        kind: ServiceKind,
        http_client: C,
        credentials: Option<&Credentials>,
    ) -> CatalogResult<Self> {
        let require = || {
            credentials.ok_or_else(|| {
                CatalogError::Authorization(format!("{} requires a username and password", kind))
            })
        };

        Ok(match kind {
            ServiceKind::Copernicus => {
                Backend::Copernicus(CopernicusProvider::new(http_client, require()?.clone()))
            }
            ServiceKind::EarthExplorer => {
                Backend::EarthExplorer(EarthExplorerProvider::connect(http_client, require()?)?)
            }
            ServiceKind::GoogleCloud => Backend::GoogleCloud(GoogleCloudProvider::new(http_client)),
        })
    }

    fn as_provider(&self) -> &dyn Provider {
        match self {
            Backend::Copernicus(p) => p,
            Backend::EarthExplorer(p) => p,
            Backend::GoogleCloud(p) => p,
        }
    }
}

impl<C: HttpClient> Provider for Backend<C> {
    fn service(&self) -> ServiceKind {
        self.as_provider().service()
    }

    fn platforms(&self) -> &'static [Platform] {
        self.as_provider().platforms()
    }

    fn search(&self, condition: &SearchCondition) -> CatalogResult<Vec<SceneIdentifier>> {
        self.as_provider().search(condition)
    }

    fn download(
        &self,
        identifier: &SceneIdentifier,
        request: &DownloadRequest,
        directory: &Path,
    ) -> CatalogResult<DownloadOutcome> {
        self.as_provider().download(identifier, request, directory)
    }

    fn metadata(&self, identifier: &SceneIdentifier) -> CatalogResult<String> {
        self.as_provider().metadata(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockHttpClient;

    #[test]
    fn test_service_kind_round_trip_names() {
        for kind in ServiceKind::ALL {
            assert_eq!(kind.as_str().parse::<ServiceKind>().unwrap(), kind);
        }
        assert_eq!("Google_Cloud".parse::<ServiceKind>().unwrap(), ServiceKind::GoogleCloud);
        assert!("planet".parse::<ServiceKind>().is_err());
    }

    #[test]
    fn test_google_cloud_needs_no_credentials() {
        let backend =
            Backend::connect(ServiceKind::GoogleCloud, MockHttpClient::offline(), None).unwrap();
        assert_eq!(backend.service(), ServiceKind::GoogleCloud);
        assert_eq!(backend.platforms().len(), 5);
    }

    #[test]
    fn test_copernicus_requires_credentials() {
        let err = Backend::connect(ServiceKind::Copernicus, MockHttpClient::offline(), None)
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::Authorization(_)));
    }

    #[test]
    fn test_copernicus_connect_is_lazy() {
        let credentials = Credentials::new("user", "secret");
        let backend = Backend::connect(
            ServiceKind::Copernicus,
            MockHttpClient::offline(),
            Some(&credentials),
        )
        .unwrap();
        assert_eq!(backend.platforms()[0].name, "Sentinel-1");
    }
}
