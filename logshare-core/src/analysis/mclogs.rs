use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::{AnalysisError, InsightsReport, LogAnalysisService, SubmitOutcome};

pub const DEFAULT_API_URL: &str = "https://api.mclo.gs";

/// Client for the mclo.gs paste and insights API.
pub struct MclogsClient {
    client: Client,
    base_url: String,
}

impl MclogsClient {
    pub fn new() -> Result<Self, AnalysisError> {
        Self::with_base_url(DEFAULT_API_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/1/{}", self.base_url, path)
    }
}

async fn check_status(response: reqwest::Response, id: &str) -> Result<reqwest::Response, AnalysisError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(AnalysisError::NotFound(id.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(AnalysisError::RateLimited),
        status if !status.is_success() => {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AnalysisError::InvalidResponse(format!("HTTP {}: {}", status, error_text)))
        }
        _ => Ok(response),
    }
}

#[async_trait::async_trait]
impl LogAnalysisService for MclogsClient {
    async fn submit(&self, content: &str) -> Result<SubmitOutcome, AnalysisError> {
        debug!("Submitting {} bytes to {}", content.len(), self.base_url);

        let response = self
            .client
            .post(self.endpoint("log"))
            .form(&[("content", content)])
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(AnalysisError::RateLimited);
        }

        // Rejections come back as JSON with success=false, often on a 4xx
        let outcome: SubmitOutcome = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(format!("Failed to parse submit response: {}", e)))?;

        if let Some((id, _)) = outcome.reference() {
            info!("Log accepted as {}", id);
        }
        Ok(outcome)
    }

    async fn fetch_raw(&self, id: &str) -> Result<String, AnalysisError> {
        debug!("Fetching raw log {}", id);
        let response = self.client.get(self.endpoint(&format!("raw/{}", id))).send().await?;
        let response = check_status(response, id).await?;
        Ok(response.text().await?)
    }

    async fn fetch_insights(&self, id: &str) -> Result<InsightsReport, AnalysisError> {
        debug!("Fetching insights for {}", id);
        let response = self
            .client
            .get(self.endpoint(&format!("insights/{}", id)))
            .send()
            .await?;
        let response = check_status(response, id).await?;

        response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidResponse(format!("Failed to parse insights: {}", e)))
    }

    fn get_service_name(&self) -> &str {
        "mclogs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MclogsClient::new().unwrap();
        assert_eq!(client.base_url, "https://api.mclo.gs");
        assert_eq!(client.get_service_name(), "mclogs");
    }

    #[test]
    fn test_endpoints() {
        let client = MclogsClient::with_base_url("http://localhost:8080/".to_string()).unwrap();
        assert_eq!(client.endpoint("log"), "http://localhost:8080/1/log");
        assert_eq!(client.endpoint("raw/abc"), "http://localhost:8080/1/raw/abc");
        assert_eq!(client.endpoint("insights/abc"), "http://localhost:8080/1/insights/abc");
    }
}
