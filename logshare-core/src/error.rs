use std::time::Duration;
use thiserror::Error;

use crate::history::StoreError;

/// Failures the console reports to the operator.
///
/// Corrupt persisted history never shows up here; it is recovered as an
/// empty history inside the store.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to fetch logs: {0}")]
    ListingFailed(String),

    #[error("Failed to decompress {file}: {reason}")]
    DecompressionFailed { file: String, reason: String },

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Upload rejected by the analysis service: {0}")]
    UploadRejected(String),

    #[error("Analysis unavailable for {id}: {reason}")]
    AnalysisUnavailable { id: String, reason: String },

    #[error("{operation} timed out after {}s", .after.as_secs())]
    TimedOut { operation: String, after: Duration },

    #[error(transparent)]
    PersistFailed(#[from] StoreError),
}

impl ConsoleError {
    /// Message shown in the operator notice.
    pub fn notice_message(&self) -> &'static str {
        match self {
            ConsoleError::ListingFailed(_) => "Failed to fetch logs. Please try again later.",
            ConsoleError::DecompressionFailed { .. } => "Failed to decompress the log file.",
            ConsoleError::ReadFailed { .. } => "An error occurred while uploading logs. Please try again later.",
            ConsoleError::UploadRejected(_) => "Failed to upload logs to MCLogs.",
            ConsoleError::AnalysisUnavailable { .. } => "Failed to fetch MCLogs data. Please try again later.",
            ConsoleError::TimedOut { .. } => "The request timed out. Please try again later.",
            ConsoleError::PersistFailed(_) => "Failed to save the upload history.",
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConsoleError::ListingFailed(_) => "listing_failed",
            ConsoleError::DecompressionFailed { .. } => "decompression_failed",
            ConsoleError::ReadFailed { .. } => "read_failed",
            ConsoleError::UploadRejected(_) => "upload_rejected",
            ConsoleError::AnalysisUnavailable { .. } => "analysis_unavailable",
            ConsoleError::TimedOut { .. } => "timed_out",
            ConsoleError::PersistFailed(_) => "persist_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConsoleError::DecompressionFailed {
            file: "2024-01-01-1.log.gz".to_string(),
            reason: "HTTP 500".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to decompress 2024-01-01-1.log.gz: HTTP 500");

        let err = ConsoleError::TimedOut {
            operation: "submit".to_string(),
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "submit timed out after 30s");
        assert_eq!(err.kind(), "timed_out");
    }

    #[test]
    fn test_persist_failure_converts() {
        let err: ConsoleError = StoreError::Persist {
            subject: "srv".to_string(),
            message: "disk full".to_string(),
        }
        .into();
        assert_eq!(err.kind(), "persist_failed");
        assert!(err.to_string().contains("disk full"));
    }
}
