use lx_config::ServiceConfig;
use lx_quota::{Clock, KvStore, QuotaTracker, SqliteKvStore, SystemClock};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub quota_tracker: Arc<QuotaTracker>,
    pub clock: Arc<dyn Clock>,
    pub version: &'static str,
}

impl AppState {
    /// Open the on-disk store named by `config` and wire it up with the
    /// system clock.
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let db_path = config.resolved_store_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Arc::new(SqliteKvStore::open(&db_path, clock.clone())?);
        tracing::info!("Using store at {}", db_path.display());
        Ok(Self::with_store(config, store, clock))
    }

    pub fn with_store(config: ServiceConfig, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        let quota_tracker = Arc::new(QuotaTracker::new(store, clock.clone()));
        Self {
            config,
            quota_tracker,
            clock,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
