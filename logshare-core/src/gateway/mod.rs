use thiserror::Error;

use crate::history::SubjectKey;

#[cfg(feature = "http-clients")]
pub mod panel;

#[cfg(feature = "http-clients")]
pub use panel::PanelFileGateway;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[cfg(feature = "http-clients")]
    #[error("File API request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("File not found: {0}")]
    NotFound(String),
}

/// File access on the managed server.
///
/// Paths are logical paths inside the server's file tree, e.g.
/// `/logs/latest.log`.
#[async_trait::async_trait]
pub trait RemoteFileGateway: Send + Sync {
    /// File names directly inside `directory`.
    async fn list(&self, subject: &SubjectKey, directory: &str) -> Result<Vec<String>, GatewayError>;

    /// Ask the server to decompress `file` in place under `root`.
    /// `Ok(false)` means the request went through but was not acknowledged.
    async fn decompress(&self, subject: &SubjectKey, root: &str, file: &str) -> Result<bool, GatewayError>;

    async fn read_contents(&self, subject: &SubjectKey, path: &str) -> Result<String, GatewayError>;

    async fn delete(&self, subject: &SubjectKey, root: &str, files: &[String]) -> Result<(), GatewayError>;

    fn get_gateway_name(&self) -> &str;
}
