//! Scene identifiers.

use std::fmt;

use serde::Serialize;

/// Opaque provider-specific name of one scene.
///
/// Joins search results with download and metadata calls, and names the
/// files a download writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SceneIdentifier(String);

impl SceneIdentifier {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SceneIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SceneIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SceneIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SceneIdentifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}
