use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::remote_store::RemoteStore;
use crate::application::repositories::{
    ActivityRepository, BudgetRepository, MessageRepository, NotificationRepository,
    TripRepository, UserRepository,
};
use crate::application::sync::{SyncHandle, Synchronizer};
use crate::domain::entities::Session;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::database::{ConnectionPool, SqliteLocalStore, Store};
use crate::shared::config::AppConfig;

/// Everything the embedding application needs, wired once at startup. The
/// remote transport and the connectivity callback live outside this crate
/// and are passed in.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub local: Arc<SqliteLocalStore>,
    pub remote: Arc<dyn RemoteStore>,
    pub connectivity: ConnectivityMonitor,
    pub trips: TripRepository,
    pub activities: ActivityRepository,
    pub messages: MessageRepository,
    pub budget: BudgetRepository,
    pub notifications: NotificationRepository,
    pub users: UserRepository,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

        if let Some(path) = database_file_path(&config.database.url) {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        let local = Arc::new(SqliteLocalStore::new(pool));
        local.initialize().await?;
        tracing::info!(url = %config.database.url, "local store ready");

        let trips = TripRepository::new(local.clone(), remote.clone(), connectivity.clone());
        let activities =
            ActivityRepository::new(local.clone(), remote.clone(), connectivity.clone());
        let messages = MessageRepository::new(local.clone(), remote.clone(), connectivity.clone());
        let budget = BudgetRepository::new(local.clone(), remote.clone(), connectivity.clone());
        let notifications = NotificationRepository::new(
            local.clone(),
            local.clone(),
            remote.clone(),
            connectivity.clone(),
        );
        let users = UserRepository::new(local.clone(), remote.clone(), connectivity.clone());

        Ok(Self {
            config,
            local,
            remote,
            connectivity,
            trips,
            activities,
            messages,
            budget,
            notifications,
            users,
        })
    }

    /// Starts the background synchronizer for an authenticated session.
    /// Called once per session; the returned handle owns the workers.
    pub fn start_sync(&self, session: Session) -> SyncHandle {
        let synchronizer = Synchronizer::new(
            self.local.clone(),
            self.remote.clone(),
            session,
            self.config.sync.clone(),
        );
        synchronizer.spawn()
    }
}

/// The on-disk path behind a sqlite URL, if there is one. In-memory
/// databases have no parent directory to create.
fn database_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    if rest.is_empty() || rest.starts_with(":memory:") {
        return None;
    }
    let path = rest.split('?').next().unwrap_or(rest);
    Some(PathBuf::from(path))
}
