use std::path::PathBuf;

/// Get the global Logshare data directory (~/.logshare)
fn get_global_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".logshare"))
}

/// Default directory for persisted upload history.
///
/// `~/.logshare/history`, or `./.logshare/history` when no home directory
/// is known. `LOGSHARE_HISTORY_DIR` is applied by the config layer.
pub fn get_history_dir() -> PathBuf {
    get_global_data_dir()
        .unwrap_or_else(|| PathBuf::from(".logshare"))
        .join("history")
}
