//! Streaming downloads of scene assets.
//!
//! This module provides:
//! - Chunked streaming of one response body to disk (`stream`)
//! - Outcome bookkeeping shared by all backends (`outcome`)
//! - Caller-facing download options (`request`)
//! - A byte-level progress side channel (`progress`)
//! - Execution of multi-asset plans with skip/partial semantics (`plan`)
//!
//! # Architecture
//!
//! ```text
//! single-asset backends ──► download_single ──┐
//!                                             ├──► stream_to_file ──► <dest>.part ──► <dest>
//! multi-asset backend ───► AssetPlan::execute ┘
//!                                 │
//!                                 └── DownloadOutcome { ok | partial | error }
//! ```

mod outcome;
mod plan;
mod progress;
mod request;
mod stream;

pub use outcome::{DownloadOutcome, DownloadStatus};
pub use plan::{AssetPlan, PlannedAsset};
pub use progress::ProgressCallback;
pub use request::DownloadRequest;
pub use stream::{download_single, stream_to_file, CHUNK_SIZE};
