use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "logshare_core=info";

/// Install a fmt subscriber filtered by `RUST_LOG`.
///
/// Hosts that already installed a subscriber keep theirs; the error from
/// the second install is returned rather than panicking.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}
