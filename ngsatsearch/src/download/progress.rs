//! Progress side channel for downloads.
//!
//! Callbacks observe bytes as they are written; they never influence control
//! flow.

use std::sync::Arc;

/// Byte-level progress callback, shared across the assets of one download.
///
/// # Arguments
///
/// * `filename` - Name of the file being written
/// * `bytes` - Bytes written so far for this file
/// * `total` - Announced size, when the server sent a content length
pub type ProgressCallback = Arc<dyn Fn(&str, u64, Option<u64>) + Send + Sync>;
