// Logshare core library
//
// Log intake, severity classification, pagination and persisted upload
// history for the server log console.

pub mod analysis;
pub mod classify;
pub mod config;
pub mod console;
pub mod decode;
pub mod error;
pub mod gateway;
pub mod history;
pub mod pagination;
pub mod paths;
pub mod telemetry;
pub mod upload;

pub use analysis::{AnalysisError, InsightsReport, LogAnalysisService, Problem, ServerSoftware, Solution, SubmitOutcome};
pub use classify::{classify, group, tint, ClassifiedLine, GroupedLines, Severity};
pub use config::ConsoleConfig;
pub use console::{LogConsoleController, LogFileRef, Notice, PendingDeletion, NOTICE_CHANNEL};
pub use error::ConsoleError;
pub use gateway::{GatewayError, RemoteFileGateway};
pub use history::{FileBackend, HistoryBackend, HistoryStore, MemoryBackend, SortOrder, StoreError, SubjectKey, UploadRecord};
pub use pagination::{page_count, paginate, visible_page_window, Page, PageControls, PageCursor};
pub use upload::{Inspection, UploadOrchestrator, UploadReceipt};

#[cfg(feature = "http-clients")]
pub use analysis::MclogsClient;
#[cfg(feature = "http-clients")]
pub use gateway::PanelFileGateway;
