//! Caller-facing download options.

use std::fmt;
use std::path::{Component, Path};

use super::progress::ProgressCallback;
use crate::error::{CatalogError, CatalogResult};

/// Options for one download call.
///
/// Single-asset backends only honor `custom_name` and `progress`.
#[derive(Clone)]
pub struct DownloadRequest {
    /// Replaces the default file name (single-asset) or scene directory name
    /// (multi-asset).
    pub custom_name: Option<String>,
    /// Band labels to fetch (`"4"`, `"8A"`, `"QA"`); `None` fetches all bands.
    pub bands: Option<Vec<String>>,
    /// Also fetch metadata, angle and manifest files.
    pub metadata: bool,
    /// Also fetch auxiliary files such as cloud masks.
    pub extra_files: bool,
    pub progress: Option<ProgressCallback>,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            custom_name: None,
            bands: None,
            metadata: true,
            extra_files: false,
            progress: None,
        }
    }
}

impl fmt::Debug for DownloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("custom_name", &self.custom_name)
            .field("bands", &self.bands)
            .field("metadata", &self.metadata)
            .field("extra_files", &self.extra_files)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl DownloadRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_custom_name(mut self, name: impl Into<String>) -> Self {
        self.custom_name = Some(name.into());
        self
    }

    pub fn with_bands<I, S>(mut self, bands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bands = Some(bands.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_metadata(mut self, metadata: bool) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_extra_files(mut self, extra_files: bool) -> Self {
        self.extra_files = extra_files;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// File name to use, falling back to `default_name`.
    ///
    /// The name must be a single path component, so the download stays
    /// inside the destination directory.
    pub(crate) fn file_name(&self, platform: &str, default_name: String) -> CatalogResult<String> {
        let name = self.custom_name.clone().unwrap_or(default_name);
        if is_plain_file_name(&name) {
            Ok(name)
        } else {
            Err(CatalogError::InvalidOption {
                platform: platform.to_string(),
                option: "custom_name".to_string(),
                reason: format!("'{}' is not a plain file name", name),
            })
        }
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}
