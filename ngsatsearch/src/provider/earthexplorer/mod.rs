//! USGS EarthExplorer inventory backend.
//!
//! Every call is a GET to `<base><action>?jsonRequest=<json>`. Answers are
//! JSON objects with an `errorCode` (null on success) and an action-specific
//! `data` payload. An API key obtained once at login is attached to every
//! later request and lives as long as the provider.

mod query;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::condition::SearchCondition;
use crate::download::{download_single, DownloadOutcome, DownloadRequest};
use crate::error::{CatalogError, CatalogResult};
use crate::http::{Credentials, HttpClient, HttpRequest};
use crate::pagination::{Page, PaginatedSearch};
use crate::platform::{OptionDomain, OptionSpec, Platform};
use crate::provider::rules::{infer_platform, IdentifierRule, LANDSAT_MSS_RULES, LANDSAT_RULES};
use crate::provider::{Provider, ServiceKind};
use crate::scene::SceneIdentifier;

/// Inventory API root, versioned.
const API_BASE_URL: &str = "https://earthexplorer.usgs.gov/inventory/json/v/1.4.0/";

/// Field holding the public scene identifier in `datasetfields`.
const PRODUCT_IDENTIFIER_FIELD: &str = "Landsat Product Identifier";

const IDENTIFIER_RULES: &[&[IdentifierRule]] = &[LANDSAT_RULES, LANDSAT_MSS_RULES];

const CLOUD_COVER: &[OptionSpec] = &[
    OptionSpec {
        name: "minCloudCover",
        domain: OptionDomain::IntegerRange { min: 0, max: 100 },
    },
    OptionSpec {
        name: "maxCloudCover",
        domain: OptionDomain::IntegerRange { min: 0, max: 100 },
    },
];

/// Landsat Collection 1 datasets.
pub const PLATFORMS: &[Platform] = &[
    Platform {
        name: "LANDSAT_8_C1",
        options: CLOUD_COVER,
    },
    Platform {
        name: "LANDSAT_ETM_C1",
        options: CLOUD_COVER,
    },
    Platform {
        name: "LANDSAT_TM_C1",
        options: CLOUD_COVER,
    },
    Platform {
        name: "LANDSAT_MSS_C1",
        options: CLOUD_COVER,
    },
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    total_hits: usize,
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DownloadLink {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetField {
    field_id: i64,
    name: String,
}

/// Maps a non-null `errorCode` onto the shared taxonomy.
fn classify_error_code(action: &str, code: &str, message: Option<&str>) -> CatalogError {
    let detail = format!("{} answered {}: {}", action, code, message.unwrap_or("no message"));
    match code {
        "AUTH_INVALID" | "AUTH_UNAUTHORIZED" | "AUTH_KEY_INVALID" => {
            CatalogError::Authorization(detail)
        }
        "METADATA_SCENES_INVALID" => CatalogError::InvalidIdentifier(detail),
        c if c.contains("NOT_FOUND") => CatalogError::DatasetNotFound(detail),
        _ => CatalogError::query(None, detail),
    }
}

fn decode<T: DeserializeOwned>(action: &str, data: Value) -> CatalogResult<T> {
    serde_json::from_value(data)
        .map_err(|e| CatalogError::InvalidMetadata(format!("unexpected {} payload: {}", action, e)))
}

/// EarthExplorer client holding an authenticated session.
pub struct EarthExplorerProvider<C: HttpClient> {
    http_client: C,
    api_key: String,
    base_url: String,
    pagination: PaginatedSearch,
}

impl<C: HttpClient> EarthExplorerProvider<C> {
    /// Logs in and returns a provider bound to the new API key.
    pub fn connect(http_client: C, credentials: &Credentials) -> CatalogResult<Self> {
        Self::connect_to(http_client, credentials, API_BASE_URL)
    }

    /// Logs in against another API root.
    pub fn connect_to(
        http_client: C,
        credentials: &Credentials,
        base_url: impl Into<String>,
    ) -> CatalogResult<Self> {
        let mut provider = Self {
            http_client,
            api_key: String::new(),
            base_url: base_url.into(),
            pagination: PaginatedSearch::default(),
        };

        let data = provider.call(
            "Login",
            &query::login_body(&credentials.username, &credentials.password),
        )?;
        provider.api_key = match data {
            Value::String(key) if !key.is_empty() => key,
            _ => {
                return Err(CatalogError::Authorization(
                    "login returned no API key".into(),
                ))
            }
        };
        info!(username = %credentials.username, "EarthExplorer session established");
        Ok(provider)
    }

    /// Performs one action and returns its `data` payload.
    fn call(&self, action: &str, body: &Value) -> CatalogResult<Value> {
        debug!(action, "EarthExplorer request");
        let request = HttpRequest::get(format!("{}{}", self.base_url, action))
            .with_query("jsonRequest", body.to_string());

        let response = self.http_client.get(&request)?.error_for_status(action)?;
        let bytes = response.bytes()?;
        let answer: ApiResponse = serde_json::from_slice(&bytes).map_err(|e| {
            CatalogError::InvalidMetadata(format!("{} returned malformed JSON: {}", action, e))
        })?;

        match answer.error_code {
            None => Ok(answer.data),
            Some(code) => Err(classify_error_code(action, &code, answer.error.as_deref())),
        }
    }

    fn fetch_page(
        &self,
        platform: &Platform,
        condition: &SearchCondition,
        offset: usize,
        rows: usize,
    ) -> CatalogResult<Page> {
        let body = query::search_body(&self.api_key, platform, condition, offset, rows);
        let data: SearchData = decode("search", self.call("search", &body)?)?;

        let identifiers = data
            .results
            .iter()
            .map(|item| {
                item.get("displayId")
                    .and_then(Value::as_str)
                    .map(SceneIdentifier::from)
                    .ok_or_else(|| CatalogError::InvalidMetadata("search result without displayId".into()))
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Page {
            total: data.total_hits,
            identifiers,
        })
    }

    /// Resolves a display id to the entity id the download action needs.
    fn entity_id(&self, dataset: &str, identifier: &SceneIdentifier) -> CatalogResult<String> {
        let data = self.call(
            "idlookup",
            &query::idlookup_body(&self.api_key, dataset, identifier.as_str()),
        )?;

        data.get(identifier.as_str())
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                CatalogError::InvalidIdentifier(format!("no entity id for {}", identifier))
            })
    }

    fn download_url(&self, dataset: &str, entity_id: &str) -> CatalogResult<String> {
        let data = self.call(
            "download",
            &query::download_body(&self.api_key, dataset, entity_id),
        )?;
        let links: Vec<DownloadLink> = decode("download", data)?;

        links
            .into_iter()
            .next()
            .map(|link| link.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                CatalogError::InvalidIdentifier(format!("no download offered for entity {}", entity_id))
            })
    }

    fn product_identifier_field(&self, dataset: &str) -> CatalogResult<i64> {
        let data = self.call(
            "datasetfields",
            &query::datasetfields_body(&self.api_key, dataset),
        )?;
        let fields: Vec<DatasetField> = decode("datasetfields", data)?;

        fields
            .into_iter()
            .find(|f| f.name == PRODUCT_IDENTIFIER_FIELD)
            .map(|f| f.field_id)
            .ok_or_else(|| {
                CatalogError::InvalidMetadata(format!(
                    "{} has no '{}' field",
                    dataset, PRODUCT_IDENTIFIER_FIELD
                ))
            })
    }
}

impl<C: HttpClient> Provider for EarthExplorerProvider<C> {
    fn service(&self) -> ServiceKind {
        ServiceKind::EarthExplorer
    }

    fn platforms(&self) -> &'static [Platform] {
        PLATFORMS
    }

    fn search(&self, condition: &SearchCondition) -> CatalogResult<Vec<SceneIdentifier>> {
        let platform = condition.validate(PLATFORMS)?;

        let source =
            |offset: usize, rows: usize| self.fetch_page(platform, condition, offset, rows);
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
        let dataset = infer_platform(IDENTIFIER_RULES, identifier.as_str())?;
        let filename = request.file_name(dataset, format!("{}.tar.gz", identifier))?;
        let entity_id = self.entity_id(dataset, identifier)?;
        debug!(identifier = %identifier, entity_id = %entity_id, "resolved entity id");

        let url = self.download_url(dataset, &entity_id)?;

        download_single(
            &self.http_client,
            &HttpRequest::get(url),
            &directory.join(filename),
            request.progress.as_ref(),
        )
    }

    fn metadata(&self, identifier: &SceneIdentifier) -> CatalogResult<String> {
        let dataset = infer_platform(IDENTIFIER_RULES, identifier.as_str())?;
        let field_id = self.product_identifier_field(dataset)?;

        let body = query::field_search_body(&self.api_key, dataset, field_id, identifier.as_str());
        let data: SearchData = decode("search", self.call("search", &body)?)?;

        let scene = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::DatasetNotFound(identifier.to_string()))?;

        serde_json::to_string_pretty(&scene)
            .map_err(|e| CatalogError::InvalidMetadata(format!("cannot render metadata: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::DownloadStatus;
    use crate::http::tests::MockHttpClient;
    use crate::http::HttpResponse;
    use serde_json::json;

    const SCENE: &str = "LC08_L1TP_174021_20190623_20190704_01_T1";

    fn ok(data: Value) -> CatalogResult<HttpResponse> {
        Ok(HttpResponse::from_bytes(
            200,
            json!({ "errorCode": null, "error": "", "data": data }).to_string(),
        ))
    }

    fn failure(code: &str) -> CatalogResult<HttpResponse> {
        Ok(HttpResponse::from_bytes(
            200,
            json!({ "errorCode": code, "error": "rejected", "data": null }).to_string(),
        ))
    }

    /// `idlookup` payload mapping the test scene to `entity_id`.
    fn lookup_answer(entity_id: Value) -> Value {
        let mut map = serde_json::Map::new();
        map.insert(SCENE.to_string(), entity_id);
        Value::Object(map)
    }

    fn body(request: &HttpRequest) -> Value {
        serde_json::from_str(request.query_value("jsonRequest").unwrap()).unwrap()
    }

    fn action(request: &HttpRequest) -> &str {
        request.url.rsplit('/').next().unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("user", "secret")
    }

    #[test]
    fn test_login_caches_api_key() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY-1")),
            "search" => {
                assert_eq!(body(request)["apiKey"], "KEY-1");
                ok(json!({ "totalHits": 1, "results": [{ "displayId": SCENE }] }))
            }
            other => panic!("unexpected action {}", other),
        });

        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();
        let result = provider.search(&SearchCondition::new("LANDSAT_8_C1")).unwrap();

        assert_eq!(result, vec![SceneIdentifier::from(SCENE)]);
        let requests = provider.http_client.recorded();
        assert_eq!(requests.len(), 2);
        assert_eq!(body(&requests[0])["username"], "user");
    }

    #[test]
    fn test_connect_to_other_api_root() {
        let client = MockHttpClient::new(|request| {
            assert_eq!(request.url, "https://inventory.example/v1/Login");
            ok(json!("KEY"))
        });

        let provider =
            EarthExplorerProvider::connect_to(client, &credentials(), "https://inventory.example/v1/")
                .unwrap();
        assert_eq!(provider.api_key, "KEY");
    }

    #[test]
    fn test_empty_api_key_is_authorization_error() {
        let client = MockHttpClient::new(|_| ok(json!("")));
        let err = EarthExplorerProvider::connect(client, &credentials())
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::Authorization(_)));
    }

    #[test]
    fn test_invalid_credentials() {
        let client = MockHttpClient::new(|_| failure("AUTH_INVALID"));
        let err = EarthExplorerProvider::connect(client, &credentials())
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::Authorization(_)));
    }

    #[test]
    fn test_search_paginates_with_one_based_offsets() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            _ => {
                let start = body(request)["startingNumber"].as_u64().unwrap() as usize - 1;
                let results: Vec<Value> = (start..(start + 100).min(250))
                    .map(|i| json!({ "displayId": format!("LC08_{:04}", i) }))
                    .collect();
                ok(json!({ "totalHits": 250, "results": results }))
            }
        });

        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();
        let result = provider.search(&SearchCondition::new("LANDSAT_8_C1")).unwrap();

        assert_eq!(result.len(), 250);
        let numbers: Vec<u64> = provider.http_client.recorded()[1..]
            .iter()
            .map(|r| body(r)["startingNumber"].as_u64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 101, 201]);
    }

    #[test]
    fn test_unauthorized_search() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            _ => failure("AUTH_UNAUTHORIZED"),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider.search(&SearchCondition::new("LANDSAT_8_C1")).unwrap_err();
        assert!(matches!(err, CatalogError::Authorization(_)));
    }

    #[test]
    fn test_other_error_code_is_query_error() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            _ => failure("DATASET_INVALID"),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider.search(&SearchCondition::new("LANDSAT_8_C1")).unwrap_err();
        assert!(matches!(err, CatalogError::Query { status: None, .. }));
    }

    #[test]
    fn test_non_json_answer_is_invalid_metadata() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            _ => Ok(HttpResponse::from_bytes(200, "<html>maintenance</html>")),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider.search(&SearchCondition::new("LANDSAT_8_C1")).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMetadata(_)));
    }

    #[test]
    fn test_download_resolves_entity_id() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            "idlookup" => {
                assert_eq!(body(request)["inputField"], "displayId");
                ok(lookup_answer(json!("LC81740212019174LGN00")))
            }
            "download" => {
                assert_eq!(body(request)["entityIds"][0], "LC81740212019174LGN00");
                assert_eq!(body(request)["products"][0], "STANDARD");
                ok(json!([{ "url": "https://dds.cr.usgs.gov/bundle.tar.gz" }]))
            }
            _ => Ok(HttpResponse::from_bytes(200, "tarball")),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let outcome = provider
            .download(&SCENE.into(), &DownloadRequest::new(), dir.path())
            .unwrap();

        assert_eq!(outcome.status, DownloadStatus::Ok);
        let expected = format!("{}.tar.gz", SCENE);
        assert_eq!(outcome.files, vec![expected.clone()]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(expected)).unwrap(),
            "tarball"
        );
    }

    #[test]
    fn test_unknown_display_id_is_invalid_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            _ => ok(lookup_answer(Value::Null)),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider
            .download(&SCENE.into(), &DownloadRequest::new(), dir.path())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidIdentifier(_)));
    }

    #[test]
    fn test_download_unsupported_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            other => panic!("unexpected action {}", other),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider
            .download(&"S2A_MSIL1C_X".into(), &DownloadRequest::new(), dir.path())
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_metadata_lookup() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            "datasetfields" => ok(json!([
                { "fieldId": 1, "name": "WRS Path" },
                { "fieldId": 19880, "name": "Landsat Product Identifier" },
            ])),
            "search" => {
                let criteria = &body(request)["additionalCriteria"];
                assert_eq!(criteria["fieldId"], 19880);
                assert_eq!(criteria["value"], SCENE);
                assert_eq!(criteria["operand"], "like");
                ok(json!({ "totalHits": 1, "results": [{ "displayId": SCENE, "cloudCover": "3" }] }))
            }
            other => panic!("unexpected action {}", other),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let metadata = provider.metadata(&SCENE.into()).unwrap();
        let parsed: Value = serde_json::from_str(&metadata).unwrap();
        assert_eq!(parsed["displayId"], SCENE);
    }

    #[test]
    fn test_metadata_scenes_invalid() {
        let client = MockHttpClient::new(|request| match action(request) {
            "Login" => ok(json!("KEY")),
            "datasetfields" => ok(json!([{ "fieldId": 7, "name": "Landsat Product Identifier" }])),
            _ => failure("METADATA_SCENES_INVALID"),
        });
        let provider = EarthExplorerProvider::connect(client, &credentials()).unwrap();

        let err = provider.metadata(&SCENE.into()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidIdentifier(_)));
    }
}
