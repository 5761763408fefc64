use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::analysis::{AnalysisError, InsightsReport, LogAnalysisService};
use crate::classify::{classify, group, ClassifiedLine, GroupedLines};
use crate::error::ConsoleError;
use crate::gateway::RemoteFileGateway;
use crate::history::{HistoryStore, SubjectKey, UploadRecord};

const COMPRESSED_SUFFIX: &str = ".gz";

/// Stored text and insights for one upload. Held in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub id: String,
    pub raw: String,
    pub insights: InsightsReport,
}

impl Inspection {
    pub fn lines(&self) -> Vec<ClassifiedLine> {
        classify(&self.raw)
    }

    pub fn grouped(&self) -> GroupedLines {
        group(&self.lines())
    }
}

/// Result of an upload that reached the history.
///
/// The record is persisted even when fetching the analysis afterwards
/// failed; `inspection` then carries that failure.
#[derive(Debug)]
pub struct UploadReceipt {
    pub record: UploadRecord,
    pub inspection: Result<Inspection, ConsoleError>,
}

/// Name of the file a compressed log decompresses to, if it is compressed.
pub fn decompressed_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(COMPRESSED_SUFFIX)
        .filter(|plain| !plain.is_empty())
}

/// Header prepended to every submission so the paste names its source.
pub fn with_provenance(file_name: &str, text: &str) -> String {
    format!("// Log file: {}\n\n{}", file_name, text)
}

/// Runs one upload end to end: file gateway, analysis service, history.
///
/// Nothing here retries. Each step either completes or aborts the upload
/// with its own error kind.
pub struct UploadOrchestrator {
    gateway: Arc<dyn RemoteFileGateway>,
    service: Arc<dyn LogAnalysisService>,
    history: Arc<HistoryStore>,
    logs_root: String,
    timeout: Option<Duration>,
}

impl UploadOrchestrator {
    pub fn new(
        gateway: Arc<dyn RemoteFileGateway>,
        service: Arc<dyn LogAnalysisService>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            gateway,
            service,
            history,
            logs_root: "/logs".to_string(),
            timeout: None,
        }
    }

    pub fn with_logs_root(mut self, root: impl Into<String>) -> Self {
        self.logs_root = root.into();
        self
    }

    /// Bound every external call. Expiry is reported as `TimedOut`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn logs_root(&self) -> &str {
        &self.logs_root
    }

    /// File names in the logs directory, unsorted.
    pub async fn list_logs(&self, subject: &SubjectKey) -> Result<Vec<String>, ConsoleError> {
        let names = self
            .bounded("list logs", self.gateway.list(subject, &self.logs_root))
            .await?
            .map_err(|e| {
                error!("Listing {} for {} failed: {}", self.logs_root, subject, e);
                ConsoleError::ListingFailed(e.to_string())
            })?;
        debug!("Listed {} log files for {}", names.len(), subject);
        Ok(names)
    }

    pub async fn upload(&self, subject: &SubjectKey, file_name: &str) -> Result<UploadReceipt, ConsoleError> {
        info!("Uploading {} for {}", file_name, subject);

        let text = self.obtain_text(subject, file_name).await?;
        let content = with_provenance(file_name, &text);

        let outcome = self
            .bounded("submit", self.service.submit(&content))
            .await?
            .map_err(|e| ConsoleError::UploadRejected(e.to_string()))?;

        let (id, url) = outcome.reference().ok_or_else(|| {
            let reason = outcome
                .error
                .clone()
                .unwrap_or_else(|| "service returned no reference".to_string());
            warn!("Upload of {} rejected: {}", file_name, reason);
            ConsoleError::UploadRejected(reason)
        })?;

        let record = UploadRecord::new(id.to_string(), url.to_string());
        self.history.append(subject, record.clone())?;
        info!("Recorded upload {} for {}", record.id, subject);

        let inspection = self.inspect(&record.id).await;
        if let Err(e) = &inspection {
            warn!("Upload {} recorded but not inspected: {}", record.id, e);
        }

        Ok(UploadReceipt { record, inspection })
    }

    /// Fetch stored text and insights for an earlier upload.
    pub async fn inspect(&self, id: &str) -> Result<Inspection, ConsoleError> {
        let unavailable = |e: AnalysisError| ConsoleError::AnalysisUnavailable {
            id: id.to_string(),
            reason: e.to_string(),
        };

        let raw = self
            .bounded("fetch raw log", self.service.fetch_raw(id))
            .await?
            .map_err(unavailable)?;
        let insights = self
            .bounded("fetch insights", self.service.fetch_insights(id))
            .await?
            .map_err(unavailable)?;

        debug!("Inspection of {} found {} problems", id, insights.problems.len());
        Ok(Inspection {
            id: id.to_string(),
            raw,
            insights,
        })
    }

    async fn obtain_text(&self, subject: &SubjectKey, file_name: &str) -> Result<String, ConsoleError> {
        let Some(plain) = decompressed_name(file_name) else {
            return self.read(subject, file_name).await;
        };

        let acknowledged = self
            .bounded("decompress", self.gateway.decompress(subject, &self.logs_root, file_name))
            .await?
            .map_err(|e| ConsoleError::DecompressionFailed {
                file: file_name.to_string(),
                reason: e.to_string(),
            })?;
        if !acknowledged {
            return Err(ConsoleError::DecompressionFailed {
                file: file_name.to_string(),
                reason: "decompression was not acknowledged".to_string(),
            });
        }

        let text = self.read(subject, plain).await;

        // Cleanup is advisory; the upload goes on whatever happens here
        let files = vec![plain.to_string()];
        match self
            .bounded("cleanup", self.gateway.delete(subject, &self.logs_root, &files))
            .await
        {
            Ok(Ok(())) => debug!("Removed decompressed {}", plain),
            Ok(Err(e)) => warn!("Could not remove decompressed {}: {}", plain, e),
            Err(e) => warn!("Could not remove decompressed {}: {}", plain, e),
        }

        text
    }

    async fn read(&self, subject: &SubjectKey, name: &str) -> Result<String, ConsoleError> {
        let path = format!("{}/{}", self.logs_root.trim_end_matches('/'), name);
        self.bounded("read", self.gateway.read_contents(subject, &path))
            .await?
            .map_err(|e| ConsoleError::ReadFailed {
                path,
                reason: e.to_string(),
            })
    }

    async fn bounded<F: Future>(&self, operation: &str, fut: F) -> Result<F::Output, ConsoleError> {
        match self.timeout {
            Some(after) => tokio::time::timeout(after, fut).await.map_err(|_| {
                warn!("{} timed out after {:?}", operation, after);
                ConsoleError::TimedOut {
                    operation: operation.to_string(),
                    after,
                }
            }),
            None => Ok(fut.await),
        }
    }
}
