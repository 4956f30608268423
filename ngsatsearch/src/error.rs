//! Error taxonomy shared by every backend.
//!
//! Each backend raises only the subset of kinds relevant to its protocol.
//! The [`SatelliteCatalog`](crate::catalog::SatelliteCatalog) facade flattens
//! all of them into a [`CatalogResponse`](crate::catalog::CatalogResponse).

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Result type for catalog and backend operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while searching or downloading scenes.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The platform is not offered by the active backend, or could not be
    /// inferred from a scene identifier.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// The scene identifier does not follow a known naming convention or the
    /// backend could not map it to an internal key.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// The backend answered "not found" for the requested scene.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// A search option is not recognized by the platform or its value is
    /// outside the declared domain.
    #[error("invalid option '{option}' for platform {platform}: {reason}")]
    InvalidOption {
        platform: String,
        option: String,
        reason: String,
    },

    /// The backend was reachable but returned a body that could not be
    /// parsed or lacked an expected field.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Credentials were rejected or the session key is no longer valid.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Any other non-success answer, carrying the raw status and message.
    #[error("query failed{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    Query {
        status: Option<u16>,
        message: String,
    },

    /// The spatial filter is not a single-ring WKT polygon.
    #[error("invalid polygon: {0}")]
    InvalidPolygon(String),

    /// The backend could not be reached at all.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend is temporarily refusing requests (rate limit, temporary ban).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Local filesystem failure outside the streaming loop.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Payload-free discriminant of [`CatalogError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedPlatform,
    InvalidIdentifier,
    DatasetNotFound,
    InvalidOption,
    InvalidMetadata,
    Authorization,
    Query,
    InvalidPolygon,
    Connection,
    ServiceUnavailable,
    Io,
}

impl CatalogError {
    /// Returns the kind of this error so callers can branch without matching
    /// on payloads.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Self::DatasetNotFound(_) => ErrorKind::DatasetNotFound,
            Self::InvalidOption { .. } => ErrorKind::InvalidOption,
            Self::InvalidMetadata(_) => ErrorKind::InvalidMetadata,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Query { .. } => ErrorKind::Query,
            Self::InvalidPolygon(_) => ErrorKind::InvalidPolygon,
            Self::Connection(_) => ErrorKind::Connection,
            Self::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn query(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Query {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_display_with_status() {
        let err = CatalogError::query(Some(500), "internal error");
        assert_eq!(err.to_string(), "query failed (HTTP 500): internal error");
    }

    #[test]
    fn test_query_display_without_status() {
        let err = CatalogError::query(None, "UNKNOWN_DATASET");
        assert_eq!(err.to_string(), "query failed: UNKNOWN_DATASET");
    }

    #[test]
    fn test_invalid_option_display() {
        let err = CatalogError::InvalidOption {
            platform: "Sentinel-2".to_string(),
            option: "orbit".to_string(),
            reason: "not a recognized option".to_string(),
        };
        assert!(err.to_string().contains("orbit"));
        assert!(err.to_string().contains("Sentinel-2"));
    }

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            CatalogError::Authorization("x".into()).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            CatalogError::io("/tmp", io::Error::from(io::ErrorKind::PermissionDenied)).kind(),
            ErrorKind::Io
        );
    }
}
