//! Download outcome bookkeeping.

use serde::Serialize;

/// Message used whenever no file could be written.
pub(crate) const NOTHING_DOWNLOADED: &str = "Nothing was downloaded";

/// Overall result of one download call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    /// Every planned asset is present.
    Ok,
    /// Some, but not all, planned assets are present (multi-asset only).
    Partial,
    /// Nothing usable was written.
    Error,
}

impl DownloadStatus {
    /// Numeric code: 0 success, 1 total failure, 2 partial success.
    pub fn code(self) -> u8 {
        match self {
            DownloadStatus::Ok => 0,
            DownloadStatus::Error => 1,
            DownloadStatus::Partial => 2,
        }
    }
}

/// Status, code, message and the filenames present after the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub status: DownloadStatus,
    pub code: u8,
    pub message: String,
    /// Files present in the destination, in plan order: newly written ones
    /// plus any that already existed and were skipped.
    pub files: Vec<String>,
    /// Subset of `files` that already existed before this call.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl DownloadOutcome {
    pub fn ok(files: Vec<String>) -> Self {
        Self::with_status(DownloadStatus::Ok, "OK", files)
    }

    pub fn partial(files: Vec<String>) -> Self {
        Self::with_status(
            DownloadStatus::Partial,
            "Some files were downloaded, but some not. See downloaded files in 'data'",
            files,
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(DownloadStatus::Error, message, Vec::new())
    }

    pub fn nothing_downloaded() -> Self {
        Self::error(NOTHING_DOWNLOADED)
    }

    /// Classifies a multi-asset run from how many planned assets ended up
    /// present.
    pub fn classify(planned: usize, files: Vec<String>, skipped: Vec<String>) -> Self {
        let mut outcome = if files.is_empty() {
            Self::nothing_downloaded()
        } else if files.len() < planned {
            Self::partial(files)
        } else {
            Self::ok(files)
        };
        outcome.skipped = skipped;
        outcome
    }

    pub fn is_ok(&self) -> bool {
        self.status == DownloadStatus::Ok
    }

    fn with_status(status: DownloadStatus, message: impl Into<String>, files: Vec<String>) -> Self {
        Self {
            status,
            code: status.code(),
            message: message.into(),
            files,
            skipped: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(DownloadStatus::Ok.code(), 0);
        assert_eq!(DownloadStatus::Error.code(), 1);
        assert_eq!(DownloadStatus::Partial.code(), 2);
    }

    #[test]
    fn test_classify() {
        assert_eq!(DownloadOutcome::classify(5, names(5), vec![]).status, DownloadStatus::Ok);

        let partial = DownloadOutcome::classify(5, names(3), vec![]);
        assert_eq!(partial.status, DownloadStatus::Partial);
        assert_eq!(partial.code, 2);
        assert_eq!(partial.files.len(), 3);

        let none = DownloadOutcome::classify(5, vec![], vec![]);
        assert_eq!(none.status, DownloadStatus::Error);
        assert_eq!(none.code, 1);
        assert_eq!(none.message, NOTHING_DOWNLOADED);
    }

    #[test]
    fn test_empty_plan_is_error() {
        let outcome = DownloadOutcome::classify(0, vec![], vec![]);
        assert_eq!(outcome.status, DownloadStatus::Error);
    }
}
