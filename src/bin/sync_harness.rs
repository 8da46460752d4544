use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use tripmate_core::{
    AppConfig, AppState, CollectionPath, ConnectivityMonitor, MemoryRemoteStore,
    NotificationStore, RemoteStore, Role, Session, Trip, TripStore, User,
};

#[derive(Debug, Clone)]
struct HarnessConfig {
    user_id: String,
    destination: String,
    participants: Vec<String>,
    sync_wait_ms: u64,
    summary_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct HarnessSummary {
    user_id: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    uptime_ms: u64,
    offline_trip_id: String,
    offline_trip_mirrored: bool,
    online_trip_id: String,
    online_trip_mirrored: bool,
    notified_users: usize,
    notifications_for_first_participant: usize,
    synced_trip_id: String,
    synced_trip_seen_locally: bool,
    local_trip_count: usize,
}

fn parse_env_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn parse_required_string(key: &str, default_value: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default_value.to_string())
}

fn parse_optional_u64(raw: Option<String>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
}

fn build_config() -> HarnessConfig {
    let participants = {
        let explicit = parse_env_list(std::env::var("TRIPMATE_HARNESS_PARTICIPANTS").ok());
        if explicit.is_empty() {
            vec!["ana".to_string(), "bruno".to_string()]
        } else {
            explicit
        }
    };

    HarnessConfig {
        user_id: parse_required_string("TRIPMATE_HARNESS_USER", "harness-user"),
        destination: parse_required_string("TRIPMATE_HARNESS_DESTINATION", "Lisbon"),
        participants,
        sync_wait_ms: parse_optional_u64(std::env::var("TRIPMATE_HARNESS_SYNC_WAIT_MS").ok())
            .unwrap_or(2_000)
            .max(100),
        summary_path: std::env::var("TRIPMATE_HARNESS_SUMMARY_PATH")
            .ok()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from),
    }
}

fn init_logging() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn make_trip(user_id: &str, destination: &str, title: &str) -> Trip {
    Trip::new(
        title.to_string(),
        destination.to_string(),
        Utc::now().timestamp_millis(),
        Utc::now().timestamp_millis() + 7 * 24 * 3600 * 1000,
        user_id.to_string(),
    )
}

async fn remote_has_trip(remote: &MemoryRemoteStore, id: &str) -> bool {
    matches!(
        remote.get_document(&CollectionPath::trips().doc(id)).await,
        Ok(Some(_))
    )
}

async fn wait_for_local_trip(state: &AppState, id: &str, deadline: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        match state.local.get_trip(id).await {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "local read failed while waiting for sync"),
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}

fn write_summary(path: &Path, summary: &HarnessSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(summary)?)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = build_config();
    let started_at = Utc::now();
    let start_instant = Instant::now();

    let mut app_config = AppConfig::from_env();
    if std::env::var("TRIPMATE_DATABASE_URL").is_err() {
        app_config.database.url = "sqlite::memory:".to_string();
        app_config.database.max_connections = 1;
    }

    info!(
        user = %cfg.user_id,
        destination = %cfg.destination,
        db = %app_config.database.url,
        "Starting sync harness"
    );

    let remote = Arc::new(MemoryRemoteStore::new());
    let (connectivity_handle, monitor) = ConnectivityMonitor::channel(false);
    let state = AppState::new(app_config, remote.clone(), monitor).await?;

    // Known users so the broadcast later has someone to reach.
    for participant in &cfg.participants {
        let mut user = User::new(
            format!("{participant}@example.com"),
            participant.to_string(),
        );
        user.id = participant.clone();
        state.users.save_user(&user).await?;
    }

    // Offline write: lands locally, never reaches the remote store.
    let offline_trip = make_trip(&cfg.user_id, &cfg.destination, "Planned offline");
    state.trips.save_trip(&offline_trip).await?;

    connectivity_handle.set_available(true);
    let offline_trip_mirrored = remote_has_trip(&remote, &offline_trip.id).await;
    info!(
        trip = %offline_trip.id,
        mirrored = offline_trip_mirrored,
        "Offline-created trip after going online"
    );

    // Online write: mirrored best-effort.
    let online_trip = make_trip(&cfg.user_id, &cfg.destination, "Planned online");
    state.trips.save_trip(&online_trip).await?;
    let online_trip_mirrored = remote_has_trip(&remote, &online_trip.id).await;

    let notified_users = state
        .notifications
        .broadcast_trip_created(&online_trip)
        .await?;
    let notifications_for_first_participant = match cfg.participants.first() {
        Some(first) => count_notifications(&state, first).await?,
        None => 0,
    };

    // A trip that only exists remotely; the synchronizer pulls it down.
    let session = Session::new(
        cfg.user_id.clone(),
        format!("{}@example.com", cfg.user_id),
        cfg.user_id.clone(),
        Role::Organiser,
    );
    let sync_handle = state.start_sync(session);
    let synced_trip = make_trip(&cfg.user_id, &cfg.destination, "Created elsewhere");
    remote
        .set(
            &CollectionPath::trips().doc(&synced_trip.id),
            serde_json::to_value(&synced_trip)?,
        )
        .await?;
    let synced_trip_seen_locally = wait_for_local_trip(
        &state,
        &synced_trip.id,
        Duration::from_millis(cfg.sync_wait_ms),
    )
    .await;
    sync_handle.shutdown();

    let local_trip_count = {
        use futures::StreamExt;
        let mut all = state.local.watch_all_trips();
        match all.next().await {
            Some(Ok(trips)) => trips.len(),
            _ => 0,
        }
    };

    let summary = HarnessSummary {
        user_id: cfg.user_id.clone(),
        started_at,
        finished_at: Utc::now(),
        uptime_ms: start_instant.elapsed().as_millis() as u64,
        offline_trip_id: offline_trip.id.clone(),
        offline_trip_mirrored,
        online_trip_id: online_trip.id.clone(),
        online_trip_mirrored,
        notified_users,
        notifications_for_first_participant,
        synced_trip_id: synced_trip.id.clone(),
        synced_trip_seen_locally,
        local_trip_count,
    };

    info!(
        offline_mirrored = summary.offline_trip_mirrored,
        online_mirrored = summary.online_trip_mirrored,
        notified = summary.notified_users,
        synced = summary.synced_trip_seen_locally,
        trips = summary.local_trip_count,
        "Sync harness finished"
    );

    if let Some(path) = &cfg.summary_path {
        if let Err(err) = write_summary(path, &summary) {
            warn!(path = %path.display(), error = %err, "Failed to write harness summary");
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

async fn count_notifications(state: &AppState, user_id: &str) -> anyhow::Result<usize> {
    use futures::StreamExt;
    let mut stream = state.local.watch_notifications_for_user(user_id);
    match stream.next().await {
        Some(Ok(notifications)) => Ok(notifications.len()),
        Some(Err(err)) => Err(err.into()),
        None => Ok(0),
    }
}
