//! Multi-asset download plans.
//!
//! A plan is the ordered list of files that make up one scene on a static
//! object store. Executing it is idempotent: files already present in the
//! destination are skipped, and a missing asset (HTTP 404) is skipped rather
//! than aborting the whole scene.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::outcome::DownloadOutcome;
use super::progress::ProgressCallback;
use super::stream::stream_to_file;
use crate::error::{CatalogError, CatalogResult};
use crate::http::{HttpClient, HttpRequest};

/// One file to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAsset {
    pub url: String,
    pub filename: String,
}

impl PlannedAsset {
    /// Plans a URL, naming the file after its last path segment.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let filename = url.rsplit('/').next().unwrap_or_default().to_string();
        Self { url, filename }
    }
}

/// Ordered list of assets for one scene.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPlan {
    pub assets: Vec<PlannedAsset>,
}

impl AssetPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_url(&mut self, url: impl Into<String>) {
        self.assets.push(PlannedAsset::from_url(url));
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.assets.iter().map(|a| a.url.as_str())
    }

    /// Downloads every asset into `directory`.
    ///
    /// The outcome is `ok` when every planned asset is present afterwards,
    /// `partial` when some are, `error` when none are. A rate-limit answer
    /// (HTTP 429/503) stops the run: remaining assets are not requested, and
    /// the files already present are still reported. With nothing present it
    /// fails with [`CatalogError::ServiceUnavailable`].
    pub fn execute<C: HttpClient + ?Sized>(
        &self,
        client: &C,
        directory: &Path,
        progress: Option<&ProgressCallback>,
    ) -> CatalogResult<DownloadOutcome> {
        fs::create_dir_all(directory).map_err(|e| CatalogError::io(directory, e))?;

        let mut present = Vec::with_capacity(self.assets.len());
        let mut skipped = Vec::new();

        for asset in &self.assets {
            let dest = directory.join(&asset.filename);
            if dest.exists() {
                debug!(file = %asset.filename, "already present, skipping");
                present.push(asset.filename.clone());
                skipped.push(asset.filename.clone());
                continue;
            }

            let response = match client.get(&HttpRequest::get(&asset.url)) {
                Ok(response) => response,
                Err(e) => {
                    warn!(url = %asset.url, error = %e, "request failed, skipping asset");
                    continue;
                }
            };

            match response.status {
                s if (200..300).contains(&s) => {}
                429 | 503 => {
                    let reason = format!(
                        "object store answered HTTP {} for {}",
                        response.status, asset.url
                    );
                    if present.is_empty() {
                        return Err(CatalogError::ServiceUnavailable(reason));
                    }
                    warn!(
                        present = present.len(),
                        planned = self.assets.len(),
                        "{}, stopping",
                        reason
                    );
                    break;
                }
                status => {
                    warn!(file = %asset.filename, status, "asset not available, skipping");
                    continue;
                }
            }

            let started = Instant::now();
            match stream_to_file(response, &dest, progress) {
                Ok(bytes) => {
                    info!(
                        file = %asset.filename,
                        bytes,
                        elapsed_secs = started.elapsed().as_secs_f64(),
                        "asset downloaded"
                    );
                    present.push(asset.filename.clone());
                }
                Err(e) => {
                    warn!(file = %asset.filename, error = %e, "asset download failed");
                }
            }
        }

        Ok(DownloadOutcome::classify(self.assets.len(), present, skipped))
    }
}
