// Log console controller
//
// Binds one subject's log listing, upload history and the detail view
// of an inspected upload. Every failure an operator should see lands as a
// notice on the "logs" channel; the controller stays usable afterwards.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analysis::LogAnalysisService;
use crate::classify::{tint, GroupedLines, Severity};
use crate::error::ConsoleError;
use crate::gateway::RemoteFileGateway;
use crate::history::{HistoryStore, SortOrder, SubjectKey, UploadRecord};
use crate::pagination::{page_count, Page, PageControls, PageCursor};
use crate::upload::{Inspection, UploadOrchestrator};

/// Channel every console notice is published on.
pub const NOTICE_CHANNEL: &str = "logs";

const DEFAULT_PAGE_SIZE: usize = 5;
const DEFAULT_MAX_BUTTONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogFileRef {
    pub name: String,
}

impl LogFileRef {
    pub fn is_compressed(&self) -> bool {
        crate::upload::decompressed_name(&self.name).is_some()
    }
}

/// Dismissible operator-facing failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub channel: &'static str,
    pub kind: &'static str,
    pub message: String,
    pub detail: String,
}

impl From<&ConsoleError> for Notice {
    fn from(err: &ConsoleError) -> Self {
        Self {
            channel: NOTICE_CHANNEL,
            kind: err.kind(),
            message: err.notice_message().to_string(),
            detail: err.to_string(),
        }
    }
}

/// Deletion awaiting the operator's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDeletion {
    One(String),
    All,
}

struct ViewState {
    log_files: Vec<LogFileRef>,
    logs_cursor: PageCursor,
    logs_order: SortOrder,
    history_cursor: PageCursor,
    history_order: SortOrder,
    notices: Vec<Notice>,
    pending: Option<PendingDeletion>,
    inspection: Option<Inspection>,
    history_visible: bool,
    show_original: bool,
    collapsed: HashMap<Severity, bool>,
}

impl ViewState {
    fn new(page_size: usize, max_buttons: usize) -> Self {
        Self {
            log_files: Vec::new(),
            logs_cursor: PageCursor::new(page_size, max_buttons),
            logs_order: SortOrder::default(),
            history_cursor: PageCursor::new(page_size, max_buttons),
            history_order: SortOrder::default(),
            notices: Vec::new(),
            pending: None,
            inspection: None,
            history_visible: false,
            show_original: false,
            collapsed: default_collapse(),
        }
    }
}

fn default_collapse() -> HashMap<Severity, bool> {
    Severity::ALL
        .into_iter()
        .map(|s| (s, s.collapsed_by_default()))
        .collect()
}

/// Console for one subject.
///
/// All methods take `&self`; uploads may run concurrently from clones of an
/// `Arc<LogConsoleController>`. View state sits behind a mutex that is never
/// held across an await.
pub struct LogConsoleController {
    subject: SubjectKey,
    orchestrator: UploadOrchestrator,
    history: Arc<HistoryStore>,
    state: Mutex<ViewState>,
}

impl LogConsoleController {
    pub fn new(
        subject: SubjectKey,
        gateway: Arc<dyn RemoteFileGateway>,
        service: Arc<dyn LogAnalysisService>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            subject,
            orchestrator: UploadOrchestrator::new(gateway, service, history.clone()),
            history,
            state: Mutex::new(ViewState::new(DEFAULT_PAGE_SIZE, DEFAULT_MAX_BUTTONS)),
        }
    }

    /// Page size and button count shared by both lists.
    pub fn with_paging(self, page_size: usize, max_buttons: usize) -> Self {
        Self {
            state: Mutex::new(ViewState::new(page_size, max_buttons)),
            ..self
        }
    }

    pub fn with_logs_root(mut self, root: impl Into<String>) -> Self {
        self.orchestrator = self.orchestrator.with_logs_root(root);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.orchestrator = self.orchestrator.with_timeout(timeout);
        self
    }

    /// Wire the HTTP collaborators and a file-backed history from config.
    #[cfg(feature = "http-clients")]
    pub fn from_config(config: &crate::config::ConsoleConfig, subject: SubjectKey) -> anyhow::Result<Self> {
        use crate::analysis::MclogsClient;
        use crate::gateway::PanelFileGateway;
        use crate::history::FileBackend;

        let gateway = PanelFileGateway::new(config.panel_url.clone())?.with_csrf_token(config.csrf_token.clone());
        let service = MclogsClient::with_base_url(config.analysis_url.clone())?;
        let history = Arc::new(HistoryStore::new(Arc::new(FileBackend::new(&config.history_dir))));

        Ok(Self::new(subject, Arc::new(gateway), Arc::new(service), history)
            .with_paging(config.page_size, config.max_page_buttons)
            .with_logs_root(config.logs_directory.clone())
            .with_timeout(config.request_timeout()))
    }

    pub fn subject(&self) -> &SubjectKey {
        &self.subject
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn report(&self, err: &ConsoleError) {
        warn!("Console notice for {}: {}", self.subject, err);
        self.state().notices.push(Notice::from(err));
    }

    // ---- log listing ----

    /// Refresh the log listing. Names are kept in lexicographic order.
    pub async fn list_logs(&self) -> Result<Vec<LogFileRef>, ConsoleError> {
        self.dismiss_notices();
        match self.orchestrator.list_logs(&self.subject).await {
            Ok(mut names) => {
                names.sort();
                let files: Vec<LogFileRef> = names.into_iter().map(|name| LogFileRef { name }).collect();
                self.state().log_files = files.clone();
                Ok(files)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn logs_page(&self) -> Page<LogFileRef> {
        let state = self.state();
        let files = ordered(&state.log_files, state.logs_order);
        state.logs_cursor.page_of(&files)
    }

    pub fn logs_controls(&self) -> Option<PageControls> {
        let state = self.state();
        state.logs_cursor.controls(state.log_files.len())
    }

    /// Reorder the listing. The current page number is kept.
    pub fn set_log_order(&self, order: SortOrder) {
        self.state().logs_order = order;
    }

    pub fn goto_logs_page(&self, page: usize) {
        self.state().logs_cursor.goto(page);
    }

    // ---- history ----

    pub fn history_page(&self) -> Page<UploadRecord> {
        let (cursor, order) = {
            let state = self.state();
            (state.history_cursor, state.history_order)
        };
        cursor.page_of(&self.history.load_sorted(&self.subject, order))
    }

    pub fn history_controls(&self) -> Option<PageControls> {
        let total = self.history.load(&self.subject).len();
        self.state().history_cursor.controls(total)
    }

    pub fn set_history_order(&self, order: SortOrder) {
        self.state().history_order = order;
    }

    pub fn goto_history_page(&self, page: usize) {
        self.state().history_cursor.goto(page);
    }

    // ---- upload and inspection ----

    /// Upload one log file. The returned record is already in the history.
    ///
    /// When the analysis cannot be fetched after a successful upload the
    /// record is still returned and the failure is left as a notice.
    pub async fn upload(&self, file_name: &str) -> Result<UploadRecord, ConsoleError> {
        self.dismiss_notices();
        let receipt = match self.orchestrator.upload(&self.subject, file_name).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.report(&e);
                return Err(e);
            }
        };

        match receipt.inspection {
            Ok(inspection) => self.show(inspection),
            Err(e) => self.report(&e),
        }
        info!("Upload {} available at {}", receipt.record.id, receipt.record.url);
        Ok(receipt.record)
    }

    /// Open the detail view for an earlier upload.
    pub async fn inspect(&self, id: &str) -> Result<Inspection, ConsoleError> {
        self.dismiss_notices();
        match self.orchestrator.inspect(id).await {
            Ok(inspection) => {
                self.show(inspection.clone());
                Ok(inspection)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    fn show(&self, inspection: Inspection) {
        let mut state = self.state();
        state.inspection = Some(inspection);
        state.show_original = false;
        state.collapsed = default_collapse();
    }

    pub fn inspection(&self) -> Option<Inspection> {
        self.state().inspection.clone()
    }

    pub fn close_detail(&self) {
        self.state().inspection = None;
    }

    /// Lines of the open inspection, bucketed by severity.
    pub fn grouped_view(&self) -> Option<GroupedLines> {
        self.state().inspection.as_ref().map(Inspection::grouped)
    }

    /// Lines of the open inspection in original order with their tint.
    pub fn original_view(&self) -> Option<Vec<(Severity, String)>> {
        self.state().inspection.as_ref().map(|inspection| {
            inspection
                .raw
                .split('\n')
                .map(|line| (tint(line), line.to_string()))
                .collect()
        })
    }

    // ---- deletion ----

    pub fn request_delete(&self, id: impl Into<String>) {
        self.state().pending = Some(PendingDeletion::One(id.into()));
    }

    pub fn request_clear(&self) {
        self.state().pending = Some(PendingDeletion::All);
    }

    pub fn pending_deletion(&self) -> Option<PendingDeletion> {
        self.state().pending.clone()
    }

    pub fn cancel(&self) {
        self.state().pending = None;
    }

    /// Carry out the pending deletion. Nothing pending is a no-op.
    pub fn confirm(&self) -> Result<(), ConsoleError> {
        let Some(pending) = self.state().pending.take() else {
            debug!("Nothing pending for {}", self.subject);
            return Ok(());
        };

        let result = match &pending {
            PendingDeletion::One(id) => self.history.remove(&self.subject, id),
            PendingDeletion::All => self.history.clear(&self.subject),
        };
        if let Err(e) = result {
            let err = ConsoleError::from(e);
            self.report(&err);
            return Err(err);
        }
        info!("Deleted {:?} from history of {}", pending, self.subject);

        let total = self.history.load(&self.subject).len();
        let mut state = self.state();
        let last = page_count(total, state.history_cursor.page_size()).max(1);
        if state.history_cursor.current() > last {
            state.history_cursor.goto(last);
        }
        Ok(())
    }

    // ---- notices and view flags ----

    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.clone()
    }

    pub fn dismiss_notices(&self) {
        self.state().notices.clear();
    }

    pub fn history_visible(&self) -> bool {
        self.state().history_visible
    }

    pub fn toggle_history(&self) {
        let mut state = self.state();
        state.history_visible = !state.history_visible;
    }

    pub fn show_original(&self) -> bool {
        self.state().show_original
    }

    pub fn toggle_original(&self) {
        let mut state = self.state();
        state.show_original = !state.show_original;
    }

    pub fn is_collapsed(&self, severity: Severity) -> bool {
        self.state()
            .collapsed
            .get(&severity)
            .copied()
            .unwrap_or_else(|| severity.collapsed_by_default())
    }

    pub fn toggle_collapsed(&self, severity: Severity) {
        let mut state = self.state();
        let entry = state
            .collapsed
            .entry(severity)
            .or_insert_with(|| severity.collapsed_by_default());
        *entry = !*entry;
    }
}

fn ordered(files: &[LogFileRef], order: SortOrder) -> Vec<LogFileRef> {
    match order {
        SortOrder::Oldest => files.to_vec(),
        SortOrder::Newest => files.iter().rev().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, InsightsReport, SubmitOutcome};
    use crate::gateway::GatewayError;
    use crate::history::MemoryBackend;
    use async_trait::async_trait;

    struct StaticGateway {
        names: Vec<&'static str>,
    }

    #[async_trait]
    impl RemoteFileGateway for StaticGateway {
        async fn list(&self, _subject: &SubjectKey, _directory: &str) -> Result<Vec<String>, GatewayError> {
            Ok(self.names.iter().map(|n| n.to_string()).collect())
        }

        async fn decompress(&self, _subject: &SubjectKey, _root: &str, _file: &str) -> Result<bool, GatewayError> {
            Ok(true)
        }

        async fn read_contents(&self, _subject: &SubjectKey, path: &str) -> Result<String, GatewayError> {
            Ok(format!("[INFO] read {}", path))
        }

        async fn delete(&self, _subject: &SubjectKey, _root: &str, _files: &[String]) -> Result<(), GatewayError> {
            Ok(())
        }

        fn get_gateway_name(&self) -> &str {
            "static"
        }
    }

    struct EchoService;

    #[async_trait]
    impl LogAnalysisService for EchoService {
        async fn submit(&self, _content: &str) -> Result<SubmitOutcome, AnalysisError> {
            Ok(SubmitOutcome::accepted("abc", "https://mclo.gs/abc"))
        }

        async fn fetch_raw(&self, _id: &str) -> Result<String, AnalysisError> {
            Ok("[INFO] start\n[ERROR] boom".to_string())
        }

        async fn fetch_insights(&self, _id: &str) -> Result<InsightsReport, AnalysisError> {
            Ok(InsightsReport::default())
        }

        fn get_service_name(&self) -> &str {
            "echo"
        }
    }

    fn controller(names: Vec<&'static str>) -> LogConsoleController {
        let history = Arc::new(HistoryStore::new(Arc::new(MemoryBackend::new())));
        LogConsoleController::new(
            SubjectKey::new("srv-1"),
            Arc::new(StaticGateway { names }),
            Arc::new(EchoService),
            history,
        )
        .with_paging(2, 5)
    }

    #[tokio::test]
    async fn test_logs_are_sorted_and_paged() {
        let console = controller(vec!["b.log", "latest.log", "a.log.gz"]);
        let files = console.list_logs().await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.log.gz", "b.log", "latest.log"]);
        assert!(files[0].is_compressed());

        let page = console.logs_page();
        assert_eq!(page.items[0].name, "latest.log");
        assert_eq!(page.total_pages, 2);

        console.set_log_order(SortOrder::Oldest);
        console.goto_logs_page(2);
        let page = console.logs_page();
        assert_eq!(page.items, vec![LogFileRef { name: "latest.log".to_string() }]);
        assert!(console.logs_controls().unwrap().show_first_prev);
    }

    #[tokio::test]
    async fn test_order_change_keeps_current_page() {
        let console = controller(vec!["a.log", "b.log", "c.log", "d.log", "e.log"]);
        console.list_logs().await.unwrap();

        console.goto_logs_page(2);
        let newest: Vec<String> = console.logs_page().items.into_iter().map(|f| f.name).collect();
        assert_eq!(newest, vec!["c.log", "b.log"]);

        console.set_log_order(SortOrder::Oldest);
        let page = console.logs_page();
        assert_eq!(page.page, 2);
        let oldest: Vec<String> = page.items.into_iter().map(|f| f.name).collect();
        assert_eq!(oldest, vec!["c.log", "d.log"]);
    }

    #[tokio::test]
    async fn test_upload_opens_detail_view() {
        let console = controller(vec![]);
        let record = console.upload("latest.log").await.unwrap();
        assert_eq!(record.id, "abc");
        assert!(console.notices().is_empty());

        let grouped = console.grouped_view().unwrap();
        assert_eq!(grouped.get(Severity::Error), ["[ERROR] boom"]);
        assert_eq!(
            console.original_view().unwrap()[0],
            (Severity::Info, "[INFO] start".to_string())
        );

        console.close_detail();
        assert!(console.inspection().is_none());
        assert!(console.grouped_view().is_none());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let console = controller(vec![]);
        console.upload("latest.log").await.unwrap();

        console.request_delete("abc");
        assert_eq!(console.history_page().total, 1);
        console.cancel();
        console.confirm().unwrap();
        assert_eq!(console.history_page().total, 1);

        console.request_delete("abc");
        console.confirm().unwrap();
        assert_eq!(console.history_page().total, 0);
        assert!(console.pending_deletion().is_none());
    }

    #[test]
    fn test_collapse_defaults_and_toggles() {
        let console = controller(vec![]);
        assert!(!console.is_collapsed(Severity::Error));
        assert!(!console.is_collapsed(Severity::Warn));
        assert!(console.is_collapsed(Severity::Info));
        assert!(console.is_collapsed(Severity::Other));

        console.toggle_collapsed(Severity::Error);
        assert!(console.is_collapsed(Severity::Error));

        assert!(!console.history_visible());
        console.toggle_history();
        assert!(console.history_visible());
        console.toggle_original();
        assert!(console.show_original());
    }

    #[test]
    fn test_notice_from_error() {
        let notice = Notice::from(&ConsoleError::ListingFailed("HTTP 500".to_string()));
        assert_eq!(notice.channel, "logs");
        assert_eq!(notice.kind, "listing_failed");
        assert_eq!(notice.message, "Failed to fetch logs. Please try again later.");
        assert_eq!(notice.detail, "Failed to fetch logs: HTTP 500");
    }
}
