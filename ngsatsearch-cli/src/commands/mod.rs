//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`platforms`] - Platforms and options of the selected service
//! - [`search`] - Scene search
//! - [`download`] - Scene download, optionally in parallel
//! - [`metadata`] - Scene metadata
//!
//! Every command prints a JSON envelope and returns the process exit code.

pub mod common;
pub mod download;
pub mod metadata;
pub mod platforms;
mod progress;
pub mod search;
