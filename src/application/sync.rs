use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::application::ports::local_store::LocalStore;
use crate::application::ports::remote_store::{CollectionPath, RemoteFilter, RemoteStore};
use crate::domain::entities::{Activity, BudgetItem, Entity, Message, Notification, Session, Trip};
use crate::infrastructure::remote::wire;
use crate::shared::config::SyncConfig;
use crate::shared::error::AppError;

/// Mirrors remote collections into the local store in the background, one
/// worker per subscription, for the lifetime of an authenticated session.
///
/// Workers only upsert. A record that disappears from a snapshot is left in
/// place locally; stale rows accumulate until the entity is written again or
/// deleted through a repository. Users are not synchronized here at all.
pub struct Synchronizer {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    session: Session,
    config: SyncConfig,
}

/// Aborts its workers on `shutdown()` and again on drop, so an abandoned
/// handle cannot leak tasks.
pub struct SyncHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    pub fn worker_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Synchronizer {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        session: Session,
        config: SyncConfig,
    ) -> Self {
        Self {
            local,
            remote,
            session,
            config,
        }
    }

    pub fn spawn(&self) -> SyncHandle {
        let delay = Duration::from_secs(self.config.resubscribe_delay_secs.max(1));
        let mut tasks = Vec::with_capacity(5);

        let local = self.local.clone();
        tasks.push(tokio::spawn(sync_collection::<Trip, _, _>(
            self.remote.clone(),
            CollectionPath::trips(),
            Some(RemoteFilter::field_equals(
                "organiserId",
                self.session.user_id.clone(),
            )),
            delay,
            move |trip| {
                let local = local.clone();
                async move { local.upsert_trip(&trip).await }
            },
        )));

        let local = self.local.clone();
        tasks.push(tokio::spawn(sync_collection::<Notification, _, _>(
            self.remote.clone(),
            CollectionPath::notifications(&self.session.user_id),
            None,
            delay,
            move |notification| {
                let local = local.clone();
                async move { local.upsert_notification(&notification).await }
            },
        )));

        let local = self.local.clone();
        tasks.push(tokio::spawn(sync_collection::<Activity, _, _>(
            self.remote.clone(),
            CollectionPath::activities(),
            None,
            delay,
            move |activity| {
                let local = local.clone();
                async move { local.upsert_activity(&activity).await }
            },
        )));

        let local = self.local.clone();
        tasks.push(tokio::spawn(sync_collection::<BudgetItem, _, _>(
            self.remote.clone(),
            CollectionPath::budget_items(),
            None,
            delay,
            move |item| {
                let local = local.clone();
                async move { local.upsert_budget_item(&item).await }
            },
        )));

        let local = self.local.clone();
        tasks.push(tokio::spawn(sync_collection::<Message, _, _>(
            self.remote.clone(),
            CollectionPath::all_trip_messages(),
            None,
            delay,
            move |message| {
                let local = local.clone();
                async move { local.upsert_message(&message).await }
            },
        )));

        tracing::info!(user_id = %self.session.user_id, workers = tasks.len(), "synchronizer started");
        SyncHandle { tasks }
    }
}

/// One worker loop. Never returns; when the transport closes the stream the
/// worker waits out the configured delay and subscribes again.
async fn sync_collection<T, A, Fut>(
    remote: Arc<dyn RemoteStore>,
    path: CollectionPath,
    filter: Option<RemoteFilter>,
    delay: Duration,
    apply: A,
) where
    T: Entity + DeserializeOwned + Send + 'static,
    A: Fn(T) -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), AppError>> + Send,
{
    loop {
        tracing::info!(path = %path, "sync worker attaching");
        let mut stream = remote.subscribe(&path, filter.clone());
        while let Some(item) = stream.next().await {
            match item {
                Ok(snapshot) => {
                    for entity in wire::decode_snapshot::<T>(&snapshot) {
                        let id = entity.id().to_string();
                        if let Err(err) = apply(entity).await {
                            tracing::warn!(path = %path, id = %id, error = %err, "sync apply failed; skipping record");
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(path = %path, error = %err, "sync subscription error");
                }
            }
        }
        tracing::warn!(path = %path, delay_secs = delay.as_secs(), "sync subscription closed; re-attaching");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::local_store::{MessageStore, TripStore};
    use crate::domain::entities::Role;
    use crate::infrastructure::database::sqlite_store::memory_store;
    use crate::infrastructure::database::SqliteLocalStore;
    use crate::infrastructure::remote::MemoryRemoteStore;

    fn session(user_id: &str) -> Session {
        Session::new(
            user_id.to_string(),
            format!("{user_id}@example.com"),
            user_id.to_string(),
            Role::Organiser,
        )
    }

    fn config() -> SyncConfig {
        SyncConfig {
            auto_start: true,
            resubscribe_delay_secs: 1,
        }
    }

    async fn seed_trip(remote: &MemoryRemoteStore, id: &str, organiser: &str) {
        let mut trip = Trip::new(
            "Summer".into(),
            "Lisbon".into(),
            1_720_000_000_000,
            1_720_600_000_000,
            organiser.into(),
        );
        trip.id = id.to_string();
        remote
            .set(
                &CollectionPath::trips().doc(id),
                wire::encode(&trip).unwrap(),
            )
            .await
            .unwrap();
    }

    async fn wait_for<F>(what: &str, mut check: F)
    where
        F: FnMut() -> bool,
    {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {what}");
    }

    async fn wait_for_trip(store: &SqliteLocalStore, id: &str) {
        for _ in 0..200 {
            if store.get_trip(id).await.unwrap().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("trip {id} never reached the local store");
    }

    #[tokio::test]
    async fn only_own_trips_are_pulled() {
        let store = Arc::new(memory_store().await);
        let remote = Arc::new(MemoryRemoteStore::new());
        seed_trip(&remote, "t-mine", "me").await;
        seed_trip(&remote, "t-other", "someone-else").await;

        let synchronizer =
            Synchronizer::new(store.clone(), remote.clone(), session("me"), config());
        let _handle = synchronizer.spawn();

        wait_for_trip(&store, "t-mine").await;
        assert!(store.get_trip("t-other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn collection_group_covers_every_trip_chat() {
        let store = Arc::new(memory_store().await);
        let remote = Arc::new(MemoryRemoteStore::new());
        for (trip, id) in [("t1", "m1"), ("t2", "m2")] {
            let mut message = Message::group(trip.into(), "u1".into(), "hi".into());
            message.id = id.to_string();
            remote
                .set(
                    &CollectionPath::trip_messages(trip).doc(id),
                    wire::encode(&message).unwrap(),
                )
                .await
                .unwrap();
        }

        let synchronizer =
            Synchronizer::new(store.clone(), remote.clone(), session("me"), config());
        let _handle = synchronizer.spawn();

        for id in ["m1", "m2"] {
            for _ in 0..200 {
                if store.get_message(id).await.unwrap().is_some() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            assert!(
                store.get_message(id).await.unwrap().is_some(),
                "message {id} never synced"
            );
        }
    }

    #[tokio::test]
    async fn absence_from_snapshot_never_deletes() {
        let store = Arc::new(memory_store().await);
        let remote = Arc::new(MemoryRemoteStore::new());
        seed_trip(&remote, "t1", "me").await;

        let synchronizer =
            Synchronizer::new(store.clone(), remote.clone(), session("me"), config());
        let _handle = synchronizer.spawn();
        wait_for_trip(&store, "t1").await;

        remote
            .remove(&CollectionPath::trips().doc("t1"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(store.get_trip("t1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn dropping_the_handle_releases_listeners() {
        let store = Arc::new(memory_store().await);
        let remote = Arc::new(MemoryRemoteStore::new());

        let synchronizer =
            Synchronizer::new(store.clone(), remote.clone(), session("me"), config());
        let handle = synchronizer.spawn();
        assert_eq!(handle.worker_count(), 5);

        {
            let remote = remote.clone();
            wait_for("all workers to attach", move || {
                remote.active_listeners() == 5
            })
            .await;
        }

        drop(handle);
        let remote_after = remote.clone();
        wait_for("workers to detach", move || {
            remote_after.active_listeners() == 0
        })
        .await;
    }
}
