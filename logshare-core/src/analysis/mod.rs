use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod insights;

#[cfg(feature = "http-clients")]
pub mod mclogs;

pub use insights::{InsightsReport, Problem, ServerSoftware, Solution};

#[cfg(feature = "http-clients")]
pub use mclogs::MclogsClient;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[cfg(feature = "http-clients")]
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Log not found: {0}")]
    NotFound(String),
}

/// What the service answered to a submission.
///
/// `success: false`, or a success without an id or URL, is a rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SubmitOutcome {
    pub fn accepted(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            url: None,
            error: Some(reason.into()),
        }
    }

    /// The `(id, url)` pair when the service accepted the log.
    pub fn reference(&self) -> Option<(&str, &str)> {
        if !self.success {
            return None;
        }
        match (self.id.as_deref(), self.url.as_deref()) {
            (Some(id), Some(url)) if !id.is_empty() && !url.is_empty() => Some((id, url)),
            _ => None,
        }
    }
}

/// External log-analysis service.
#[async_trait::async_trait]
pub trait LogAnalysisService: Send + Sync {
    async fn submit(&self, content: &str) -> Result<SubmitOutcome, AnalysisError>;
    async fn fetch_raw(&self, id: &str) -> Result<String, AnalysisError>;
    async fn fetch_insights(&self, id: &str) -> Result<InsightsReport, AnalysisError>;
    fn get_service_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_requires_success_id_and_url() {
        assert_eq!(
            SubmitOutcome::accepted("abc", "https://x/abc").reference(),
            Some(("abc", "https://x/abc"))
        );
        assert_eq!(SubmitOutcome::rejected("too large").reference(), None);

        let missing_url = SubmitOutcome {
            success: true,
            id: Some("abc".to_string()),
            url: None,
            error: None,
        };
        assert_eq!(missing_url.reference(), None);

        let empty_url = SubmitOutcome {
            url: Some(String::new()),
            ..SubmitOutcome::accepted("abc", "")
        };
        assert_eq!(empty_url.reference(), None);
    }

    #[test]
    fn test_submit_outcome_parsing() {
        let ok: SubmitOutcome =
            serde_json::from_str(r#"{"success":true,"id":"HpAwPry","url":"https://mclo.gs/HpAwPry","raw":"https://api.mclo.gs/1/raw/HpAwPry"}"#)
                .unwrap();
        assert_eq!(ok.reference(), Some(("HpAwPry", "https://mclo.gs/HpAwPry")));

        let failed: SubmitOutcome = serde_json::from_str(r#"{"success":false,"error":"Required POST argument 'content' is empty."}"#).unwrap();
        assert!(failed.reference().is_none());
        assert!(failed.error.is_some());
    }
}
