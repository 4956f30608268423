//! Copernicus Open Access Hub backend.
//!
//! Searches through the OpenSearch endpoint and downloads whole products
//! through OData, both with Basic authentication.
//!
//! # URL Pattern
//!
//! - search: `https://scihub.copernicus.eu/dhus/search?q=...&rows=100&start=N&orderby=beginposition asc`
//! - download: `https://scihub.copernicus.eu/dhus/odata/v1/Products('<uuid>')/$value`
//!
//! A scene identifier is resolved to its product UUID by re-running a
//! single-result query on the identifier itself.

mod feed;
mod query;

use std::path::Path;

use tracing::{debug, info};

use crate::condition::SearchCondition;
use crate::download::{download_single, DownloadOutcome, DownloadRequest};
use crate::error::{CatalogError, CatalogResult};
use crate::http::{Credentials, HttpClient, HttpRequest, HttpResponse};
use crate::pagination::{Page, PaginatedSearch};
use crate::platform::{OptionDomain, OptionSpec, Platform};
use crate::provider::{Provider, ServiceKind};
use crate::scene::SceneIdentifier;

use feed::{Feed, FeedEntry};
use query::build_query;

/// OpenSearch endpoint.
const SEARCH_URL: &str = "https://scihub.copernicus.eu/dhus/search";

/// OData root; products live under `Products('<uuid>')`.
const ODATA_URL: &str = "https://scihub.copernicus.eu/dhus/odata/v1/";

const ORDER_BY: &str = "beginposition asc";

const SENTINEL_FILENAME_HINT: &str = "S1A_*, S1B_*, S2A_*, S2B_*, S3A_*, S3B_*";

/// Platforms and options offered by the hub.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "Sentinel-1",
        options: &[
            OptionSpec {
                name: "sensoroperationalmode",
                domain: OptionDomain::Enumerated {
                    values: &["SW", "IW", "EW", "WV"],
                },
            },
            OptionSpec {
                name: "producttype",
                domain: OptionDomain::Enumerated {
                    values: &["SLC", "GRD", "OCN"],
                },
            },
            OptionSpec {
                name: "polarisationmode",
                domain: OptionDomain::Enumerated {
                    values: &["HH", "HV", "VH", "VV", "HH+HV", "VV+VH"],
                },
            },
            OptionSpec {
                name: "filename",
                domain: OptionDomain::Pattern {
                    hint: SENTINEL_FILENAME_HINT,
                },
            },
        ],
    },
    Platform {
        name: "Sentinel-2",
        options: &[
            OptionSpec {
                name: "cloudcoverpercentage",
                domain: OptionDomain::Pattern {
                    hint: "range like [0 TO 9.4]",
                },
            },
            OptionSpec {
                name: "producttype",
                domain: OptionDomain::Enumerated {
                    values: &["S2MSI1C", "S2MSI2A", "S2MSI2Ap"],
                },
            },
            OptionSpec {
                name: "filename",
                domain: OptionDomain::Pattern {
                    hint: SENTINEL_FILENAME_HINT,
                },
            },
        ],
    },
    Platform {
        name: "Sentinel-3",
        options: &[
            OptionSpec {
                name: "producttype",
                domain: OptionDomain::Enumerated {
                    values: &[
                        "OL_1_EFR___",
                        "OL_1_ERR___",
                        "OL_2_LFR___",
                        "OL_2_LRR___",
                        "SR_1_SRA___",
                        "SR_1_SRA_A_",
                        "SR_1_SRA_BS",
                        "SR_2_LAN___",
                        "SL_1_RBT___",
                        "SL_2_LST___",
                        "SY_2_SYN___",
                        "SY_2_V10___",
                        "SY_2_VG1___",
                        "SY_2_VGP___",
                    ],
                },
            },
            OptionSpec {
                name: "filename",
                domain: OptionDomain::Pattern {
                    hint: SENTINEL_FILENAME_HINT,
                },
            },
        ],
    },
];

/// Copernicus Open Access Hub client.
pub struct CopernicusProvider<C: HttpClient> {
    http_client: C,
    credentials: Credentials,
    search_url: String,
    odata_url: String,
    pagination: PaginatedSearch,
}

impl<C: HttpClient> CopernicusProvider<C> {
    /// Creates a new Copernicus provider.
    ///
    /// No request is made until the first search or download.
    pub fn new(http_client: C, credentials: Credentials) -> Self {
        Self {
            http_client,
            credentials,
            search_url: SEARCH_URL.to_string(),
            odata_url: ODATA_URL.to_string(),
            pagination: PaginatedSearch::default(),
        }
    }

    /// Points the provider at another hub mirror.
    pub fn with_endpoints(mut self, search_url: impl Into<String>, odata_url: impl Into<String>) -> Self {
        self.search_url = search_url.into();
        self.odata_url = odata_url.into();
        self
    }

    fn opensearch(&self, q: &str, offset: usize, rows: usize) -> CatalogResult<Feed> {
        debug!(offset, rows, "querying OpenSearch");
        let request = HttpRequest::get(&self.search_url)
            .with_query("q", q)
            .with_query("rows", rows.to_string())
            .with_query("start", offset.to_string())
            .with_query("orderby", ORDER_BY)
            .with_basic_auth(&self.credentials);

        let response = check_search_status(self.http_client.get(&request)?)?;
        Feed::parse(&response.text()?)
    }

    fn fetch_page(&self, q: &str, offset: usize, rows: usize) -> CatalogResult<Page> {
        self.opensearch(q, offset, rows)?.into_page()
    }

    /// First feed entry whose text matches `identifier`.
    fn lookup(&self, identifier: &SceneIdentifier) -> CatalogResult<FeedEntry> {
        self.opensearch(identifier.as_str(), 0, 1)?
            .entries
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::DatasetNotFound(identifier.to_string()))
    }

    fn product_url(&self, uuid: &str) -> String {
        format!("{}Products('{}')/$value", self.odata_url, uuid)
    }
}

/// The search endpoint answers 404 only when the hub itself is misrouted.
fn check_search_status(response: HttpResponse) -> CatalogResult<HttpResponse> {
    if response.status == 404 {
        return Err(CatalogError::Connection(
            "search endpoint not found (HTTP 404)".into(),
        ));
    }
    response.error_for_status("OpenSearch")
}

impl<C: HttpClient> Provider for CopernicusProvider<C> {
    fn service(&self) -> ServiceKind {
        ServiceKind::Copernicus
    }

    fn platforms(&self) -> &'static [Platform] {
        PLATFORMS
    }

    fn search(&self, condition: &SearchCondition) -> CatalogResult<Vec<SceneIdentifier>> {
        let platform = condition.validate(PLATFORMS)?;
        let q = build_query(platform, condition);
        debug!(query = %q, "built OpenSearch query");

        let source = |offset: usize, rows: usize| self.fetch_page(&q, offset, rows);
        let identifiers = self.pagination.collect(&source)?;

        info!(platform = platform.name, count = identifiers.len(), "search complete");
        Ok(identifiers)
    }

    fn download(
        &self,
        identifier: &SceneIdentifier,
        request: &DownloadRequest,
        directory: &Path,
    ) -> CatalogResult<DownloadOutcome> {
        let filename =
            request.file_name(self.service().as_str(), format!("{}.zip", identifier))?;
        let entry = self.lookup(identifier)?;
        let uuid = entry.product_uuid()?;
        debug!(identifier = %identifier, uuid, "resolved product uuid");

        let http_request = HttpRequest::get(self.product_url(uuid)).with_basic_auth(&self.credentials);

        download_single(
            &self.http_client,
            &http_request,
            &directory.join(filename),
            request.progress.as_ref(),
        )
    }

    fn metadata(&self, identifier: &SceneIdentifier) -> CatalogResult<String> {
        Ok(self.lookup(identifier)?.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadStatus;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpResponse;
    use feed::tests::feed_xml;

    fn credentials() -> Credentials {
        Credentials::new("user", "secret")
    }

    fn scene_ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("S2A_MSIL1C_{:04}", i)).collect()
    }

    #[test]
    fn test_search_paginates_250_results() {
        let client = MockHttpClient::new(|request| {
            let start: usize = request.query_value("start").unwrap().parse().unwrap();
            let rows: usize = request.query_value("rows").unwrap().parse().unwrap();
            let ids = scene_ids(start..(start + rows).min(250));
            Ok(HttpResponse::from_bytes(200, feed_xml(250, &ids)))
        });
        let provider = CopernicusProvider::new(client, credentials());

        let result = provider.search(&SearchCondition::new("Sentinel-2")).unwrap();

        assert_eq!(result.len(), 250);
        assert_eq!(result[0].as_str(), "S2A_MSIL1C_0000");
        assert_eq!(result[249].as_str(), "S2A_MSIL1C_0249");

        let requests = provider.http_client.recorded();
        assert_eq!(requests.len(), 3);
        let starts: Vec<_> = requests.iter().map(|r| r.query_value("start").unwrap()).collect();
        assert_eq!(starts, vec!["0", "100", "200"]);
        assert!(requests.iter().all(|r| r.basic_auth.is_some()));
        assert_eq!(requests[0].query_value("orderby"), Some("beginposition asc"));
        assert_eq!(requests[0].query_value("q"), Some("platformname:Sentinel-2"));
    }

    #[test]
    fn test_unknown_option_rejected_offline() {
        let provider = CopernicusProvider::new(MockHttpClient::offline(), credentials());
        let condition = SearchCondition::new("Sentinel-2").with_option("polarisationmode", "HH");

        let err = provider.search(&condition).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOption { .. }));
    }

    #[test]
    fn test_search_unauthorized() {
        let client = MockHttpClient::new(|_| Ok(HttpResponse::from_bytes(401, "")));
        let provider = CopernicusProvider::new(client, credentials());

        let err = provider.search(&SearchCondition::new("Sentinel-1")).unwrap_err();
        assert!(matches!(err, CatalogError::Authorization(_)));
    }

    #[test]
    fn test_download_resolves_uuid_and_streams_zip() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| {
            if request.url.contains("Products(") {
                Ok(HttpResponse::from_bytes(200, "zipdata"))
            } else {
                Ok(HttpResponse::from_bytes(200, feed_xml(1, &["S1A_SCENE".to_string()])))
            }
        });
        let provider = CopernicusProvider::new(client, credentials());

        let outcome = provider
            .download(&"S1A_SCENE".into(), &DownloadRequest::new(), dir.path())
            .unwrap();

        assert_eq!(outcome.status, DownloadStatus::Ok);
        assert_eq!(outcome.files, vec!["S1A_SCENE.zip"]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("S1A_SCENE.zip")).unwrap(),
            "zipdata"
        );
        let requests = provider.http_client.recorded();
        assert_eq!(
            requests[1].url,
            "https://scihub.copernicus.eu/dhus/odata/v1/Products('uuid-S1A_SCENE')/$value"
        );
        assert_eq!(requests[0].query_value("q"), Some("S1A_SCENE"));
        assert_eq!(requests[0].query_value("rows"), Some("1"));
    }

    #[test]
    fn test_download_with_custom_name() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| {
            if request.url.contains("Products(") {
                Ok(HttpResponse::from_bytes(200, "zipdata"))
            } else {
                Ok(HttpResponse::from_bytes(200, feed_xml(1, &["S1A_SCENE".to_string()])))
            }
        });
        let provider = CopernicusProvider::new(client, credentials());
        let request = DownloadRequest::new().with_custom_name("renamed.zip");

        let outcome = provider.download(&"S1A_SCENE".into(), &request, dir.path()).unwrap();

        assert_eq!(outcome.files, vec!["renamed.zip"]);
        assert!(dir.path().join("renamed.zip").exists());
    }

    #[test]
    fn test_entry_without_uuid_or_id_is_invalid_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|_| {
            Ok(HttpResponse::from_bytes(
                200,
                "<feed xmlns=\"http://www.w3.org/2005/Atom\" \
                       xmlns:opensearch=\"http://a9.com/-/spec/opensearch/1.1/\">\
                 <opensearch:totalResults>1</opensearch:totalResults>\
                 <entry><title>S1A_SCENE</title></entry></feed>",
            ))
        });
        let provider = CopernicusProvider::new(client, credentials());

        let err = provider
            .download(&"S1A_SCENE".into(), &DownloadRequest::new(), dir.path())
            .unwrap_err();

        assert!(matches!(err, CatalogError::InvalidMetadata(_)));
        assert_eq!(provider.http_client.request_count(), 1);
        assert!(!dir.path().join("S1A_SCENE.zip").exists());
    }

    #[test]
    fn test_absolute_custom_name_rejected_offline() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CopernicusProvider::new(MockHttpClient::offline(), credentials());
        let request = DownloadRequest::new().with_custom_name("/tmp/renamed.zip");

        let err = provider.download(&"S1A_SCENE".into(), &request, dir.path()).unwrap_err();

        assert!(matches!(err, CatalogError::InvalidOption { .. }));
    }

    #[test]
    fn test_mirror_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| {
            if request.url.starts_with("https://mirror.example/odata/") {
                Ok(HttpResponse::from_bytes(200, "zipdata"))
            } else {
                assert_eq!(request.url, "https://mirror.example/search");
                Ok(HttpResponse::from_bytes(200, feed_xml(1, &["S3A_SCENE".to_string()])))
            }
        });
        let provider = CopernicusProvider::new(client, credentials())
            .with_endpoints("https://mirror.example/search", "https://mirror.example/odata/");

        let outcome = provider
            .download(&"S3A_SCENE".into(), &DownloadRequest::new(), dir.path())
            .unwrap();

        assert!(outcome.is_ok());
    }

    #[test]
    fn test_metadata_not_found() {
        let client = MockHttpClient::new(|_| Ok(HttpResponse::from_bytes(200, feed_xml(0, &[]))));
        let provider = CopernicusProvider::new(client, credentials());

        let err = provider.metadata(&"S2B_NOPE".into()).unwrap_err();
        assert!(matches!(err, CatalogError::DatasetNotFound(_)));
    }

    #[test]
    fn test_metadata_returns_entry_xml() {
        let client = MockHttpClient::new(|_| {
            Ok(HttpResponse::from_bytes(200, feed_xml(1, &["S2B_FOUND".to_string()])))
        });
        let provider = CopernicusProvider::new(client, credentials());

        let xml = provider.metadata(&"S2B_FOUND".into()).unwrap();
        assert!(xml.contains("<title>S2B_FOUND</title>"));
    }
}
