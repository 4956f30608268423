//! HTTP client abstraction for testability.
//!
//! Every backend talks to the network through [`HttpClient`], so tests can
//! substitute a scripted client and production code uses [`ReqwestClient`].
//! Responses keep their body as a reader: search pages are read fully, while
//! asset downloads are streamed chunk by chunk.

use std::fmt;
use std::io::Read;
use std::time::Duration;

use tracing::debug;

use crate::error::{CatalogError, CatalogResult};

/// Default overall timeout for one request, body included.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Longest slice of an error body carried into [`CatalogError::Query`].
const ERROR_BODY_LIMIT: usize = 512;

/// Username/password pair used for Basic auth or session login.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Timeouts applied to every request made by [`ReqwestClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// A GET request: URL, query parameters and optional Basic auth.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub basic_auth: Option<Credentials>,
}

impl HttpRequest {
    /// Creates a GET request for the given URL.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            basic_auth: None,
        }
    }

    /// Appends a query parameter. Values are URL-encoded by the client.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attaches Basic authentication.
    pub fn with_basic_auth(mut self, credentials: &Credentials) -> Self {
        self.basic_auth = Some(credentials.clone());
        self
    }

    /// Returns the first value of a query parameter.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status, announced length and a streaming body.
pub struct HttpResponse {
    pub status: u16,
    pub content_length: Option<u64>,
    body: Box<dyn Read + Send>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    /// Creates a response around a streaming body.
    pub fn new(status: u16, content_length: Option<u64>, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            content_length,
            body: Box::new(body),
        }
    }

    /// Creates a response with an in-memory body.
    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let len = body.len() as u64;
        Self::new(status, Some(len), std::io::Cursor::new(body))
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Hands out the body reader for streaming.
    pub fn into_body(self) -> Box<dyn Read + Send> {
        self.body
    }

    /// Reads the whole body into memory.
    pub fn bytes(mut self) -> CatalogResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.body
            .read_to_end(&mut buf)
            .map_err(|e| CatalogError::Connection(format!("failed to read response: {}", e)))?;
        Ok(buf)
    }

    /// Reads the whole body as UTF-8 text (lossy).
    pub fn text(self) -> CatalogResult<String> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Maps non-success statuses onto the shared taxonomy.
    ///
    /// 401 becomes [`CatalogError::Authorization`], 404
    /// [`CatalogError::DatasetNotFound`], 429/503
    /// [`CatalogError::ServiceUnavailable`]; anything else that is not 2xx
    /// becomes [`CatalogError::Query`] carrying the status and body snippet.
    pub fn error_for_status(self, context: &str) -> CatalogResult<Self> {
        match self.status {
            s if (200..300).contains(&s) => Ok(self),
            401 => Err(CatalogError::Authorization(format!(
                "{} rejected the credentials (HTTP 401)",
                context
            ))),
            404 => Err(CatalogError::DatasetNotFound(format!(
                "{} answered HTTP 404",
                context
            ))),
            429 | 503 => Err(CatalogError::ServiceUnavailable(format!(
                "{} answered HTTP {}",
                context, self.status
            ))),
            status => {
                let body = self.text().unwrap_or_default();
                let snippet: String = body.chars().take(ERROR_BODY_LIMIT).collect();
                Err(CatalogError::query(
                    Some(status),
                    format!("{}: {}", context, snippet.trim()),
                ))
            }
        }
    }
}

/// Trait for HTTP client operations.
///
/// Returns the raw response for any status; transport failures (DNS,
/// connect, timeout) are reported as [`CatalogError::Connection`].
pub trait HttpClient: Send + Sync {
    fn get(&self, request: &HttpRequest) -> CatalogResult<HttpResponse>;
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn get(&self, request: &HttpRequest) -> CatalogResult<HttpResponse> {
        (**self).get(request)
    }
}

/// Real HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with default timeouts.
    pub fn new() -> CatalogResult<Self> {
        Self::with_settings(HttpSettings::default())
    }

    /// Creates a new ReqwestClient with custom timeouts.
    pub fn with_settings(settings: HttpSettings) -> CatalogResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(concat!("ngsatsearch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Connection(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, request: &HttpRequest) -> CatalogResult<HttpResponse> {
        debug!(url = %request.url, params = request.query.len(), "GET");

        let mut builder = self.client.get(&request.url).query(&request.query);
        if let Some(credentials) = &request.basic_auth {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                CatalogError::Connection(format!("request to {} timed out", request.url))
            } else {
                CatalogError::Connection(format!("request to {} failed: {}", request.url, e))
            }
        })?;

        let status = response.status().as_u16();
        let content_length = response.content_length();
        Ok(HttpResponse::new(status, content_length, response))
    }
}
