use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{GatewayError, RemoteFileGateway};
use crate::decode::decode_log_bytes;
use crate::history::SubjectKey;

const CSRF_HEADER: &str = "X-CSRF-TOKEN";

#[derive(Debug, Deserialize)]
struct FileListResponse {
    data: Vec<FileObject>,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    attributes: FileAttributes,
}

#[derive(Debug, Deserialize)]
struct FileAttributes {
    name: String,
}

#[derive(Debug, Serialize)]
struct DecompressRequest<'a> {
    root: &'a str,
    file: &'a str,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    root: &'a str,
    files: &'a [String],
}

/// Client for the panel's per-server file API.
pub struct PanelFileGateway {
    client: Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl PanelFileGateway {
    pub fn new(base_url: String) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: None,
        })
    }

    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token;
        self
    }

    fn files_url(&self, subject: &SubjectKey, action: &str) -> String {
        format!("{}/api/client/servers/{}/files/{}", self.base_url, subject, action)
    }

    /// Every call carries the anti-forgery header, empty when no token is known.
    fn with_token(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(CSRF_HEADER, self.csrf_token.as_deref().unwrap_or(""))
    }
}

fn ensure_success(endpoint: &str, status: StatusCode) -> Result<(), GatewayError> {
    if status == StatusCode::NOT_FOUND {
        return Err(GatewayError::NotFound(endpoint.to_string()));
    }
    if !status.is_success() {
        return Err(GatewayError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl RemoteFileGateway for PanelFileGateway {
    async fn list(&self, subject: &SubjectKey, directory: &str) -> Result<Vec<String>, GatewayError> {
        let url = self.files_url(subject, "list");
        debug!("Listing {} for {}", directory, subject);

        let response = self
            .with_token(self.client.get(&url).query(&[("directory", directory)]))
            .send()
            .await?;
        ensure_success("files/list", response.status())?;

        let listing: FileListResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse file list: {}", e)))?;

        Ok(listing.data.into_iter().map(|f| f.attributes.name).collect())
    }

    async fn decompress(&self, subject: &SubjectKey, root: &str, file: &str) -> Result<bool, GatewayError> {
        let url = self.files_url(subject, "decompress");
        debug!("Decompressing {}/{} for {}", root, file, subject);

        let response = self
            .with_token(self.client.post(&url).json(&DecompressRequest { root, file }))
            .send()
            .await?;

        // The panel acknowledges a finished decompression with 204 only
        Ok(response.status() == StatusCode::NO_CONTENT)
    }

    async fn read_contents(&self, subject: &SubjectKey, path: &str) -> Result<String, GatewayError> {
        let url = self.files_url(subject, "contents");
        debug!("Reading {} for {}", path, subject);

        let response = self
            .with_token(self.client.get(&url).query(&[("file", path)]))
            .send()
            .await?;
        ensure_success("files/contents", response.status())?;

        let bytes = response.bytes().await?;
        Ok(decode_log_bytes(&bytes))
    }

    async fn delete(&self, subject: &SubjectKey, root: &str, files: &[String]) -> Result<(), GatewayError> {
        let url = self.files_url(subject, "delete");
        debug!("Deleting {:?} under {} for {}", files, root, subject);

        let response = self
            .with_token(self.client.post(&url).json(&DeleteRequest { root, files }))
            .send()
            .await?;
        ensure_success("files/delete", response.status())
    }

    fn get_gateway_name(&self) -> &str {
        "panel"
    }
}
