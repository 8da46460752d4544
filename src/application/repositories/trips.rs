use std::sync::Arc;

use futures::{future, StreamExt};

use super::routing::{self, SourceSelection};
use crate::application::ports::local_store::{LiveStream, TripStore};
use crate::application::ports::remote_store::{CollectionPath, RemoteDocument, RemoteStore};
use crate::domain::entities::Trip;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct TripRepository {
    local: Arc<dyn TripStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

#[derive(Default)]
struct AllTripsState {
    remote: Option<Vec<Trip>>,
    local: Option<Vec<Trip>>,
    last: Option<Vec<Trip>>,
    failed: bool,
}

impl AllTripsState {
    /// A non-empty remote result wins; otherwise the latest local one.
    fn emit(&mut self) -> Option<Result<Vec<Trip>, AppError>> {
        let candidate = match (&self.remote, &self.local) {
            (Some(remote), _) if !remote.is_empty() => remote.clone(),
            (_, Some(local)) => local.clone(),
            (Some(remote), None) => remote.clone(),
            (None, None) => return None,
        };
        if self.last.as_ref() == Some(&candidate) {
            return None;
        }
        self.last = Some(candidate.clone());
        Some(Ok(candidate))
    }
}

enum Feed {
    Local(Result<Vec<Trip>, AppError>),
    Remote(Vec<Trip>),
}

impl TripRepository {
    pub fn new(
        local: Arc<dyn TripStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
        }
    }

    pub fn watch_trip(&self, id: &str) -> LiveStream<Option<Trip>> {
        match routing::select_source(&self.connectivity, "trip") {
            SourceSelection::Remote => {
                let key = id.to_string();
                self.remote
                    .subscribe_document(&CollectionPath::trips().doc(id))
                    .map(move |item| {
                        item.map(|value| {
                            value.and_then(|value| {
                                wire::decode_document(&RemoteDocument {
                                    key: key.clone(),
                                    value,
                                })
                            })
                        })
                    })
                    .boxed()
            }
            SourceSelection::Local => self.local.watch_trip(id),
        }
    }

    /// The one read that stays reactive to both sources: the local live query
    /// and the remote subscription are attached together and kept for the
    /// stream's whole life. A remote error ends the remote side only; a local
    /// error propagates and closes the stream.
    pub fn watch_all_trips(&self) -> LiveStream<Vec<Trip>> {
        let local = self.local.watch_all_trips().map(Feed::Local);
        let remote = self
            .remote
            .subscribe(&CollectionPath::trips(), None)
            .filter_map(|item| {
                future::ready(match item {
                    Ok(snapshot) => Some(wire::decode_snapshot::<Trip>(&snapshot)),
                    Err(err) => {
                        tracing::warn!(error = %err, "remote trip feed failed; continuing on local only");
                        None
                    }
                })
            })
            .map(Feed::Remote);

        futures::stream::select(local, remote)
            .scan(AllTripsState::default(), |state, feed| {
                if state.failed {
                    return future::ready(None);
                }
                let out = match feed {
                    Feed::Remote(trips) => {
                        state.remote = Some(trips);
                        state.emit()
                    }
                    Feed::Local(Ok(trips)) => {
                        state.local = Some(trips);
                        state.emit()
                    }
                    Feed::Local(Err(err)) => {
                        state.failed = true;
                        Some(Err(err))
                    }
                };
                future::ready(Some(out))
            })
            .filter_map(|item| future::ready(item))
            .boxed()
    }

    pub async fn get_trip(&self, id: &str) -> Result<Option<Trip>, AppError> {
        if self.connectivity.is_available() {
            match self
                .remote
                .get_document(&CollectionPath::trips().doc(id))
                .await
            {
                Ok(Some(value)) => {
                    let document = RemoteDocument {
                        key: id.to_string(),
                        value,
                    };
                    if let Some(trip) = wire::decode_document::<Trip>(&document) {
                        return Ok(Some(trip));
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(trip_id = id, error = %err, "remote trip fetch failed; falling back to local");
                }
            }
        }
        self.local.get_trip(id).await
    }

    /// Local first; the remote mirror is best effort and never retried.
    pub async fn save_trip(&self, trip: &Trip) -> Result<(), AppError> {
        self.local.upsert_trip(trip).await?;
        self.mirror_save(trip).await;
        Ok(())
    }

    pub async fn delete_trip(&self, id: &str) -> Result<(), AppError> {
        self.local.delete_trip(id).await?;
        if self.connectivity.is_available() {
            let path = CollectionPath::trips().doc(id);
            if let Err(err) = self.remote.remove(&path).await {
                tracing::warn!(trip_id = id, error = %err, "remote trip delete failed; local copy removed");
            }
        }
        Ok(())
    }

    /// Adds `user_id` to the trip's participant set and saves through the
    /// normal write path. Joining a trip twice changes nothing.
    pub async fn join_trip(&self, trip_id: &str, user_id: &str) -> Result<Trip, AppError> {
        let mut trip = self
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("trip {trip_id}")))?;

        if !trip.add_participant(user_id) {
            return Ok(trip);
        }
        self.save_trip(&trip).await?;
        Ok(trip)
    }

    async fn mirror_save(&self, trip: &Trip) {
        if !self.connectivity.is_available() {
            return;
        }
        let path = CollectionPath::trips().doc(&trip.id);
        match wire::encode(trip) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(trip_id = %trip.id, error = %err, "remote trip mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(trip_id = %trip.id, error = %err, "could not encode trip for remote");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingRemote;
    use crate::infrastructure::connectivity::ConnectivityHandle;
    use crate::infrastructure::database::sqlite_store::memory_store;
    use crate::infrastructure::database::SqliteLocalStore;
    use std::time::Duration;

    async fn setup(
        online: bool,
    ) -> (
        TripRepository,
        Arc<SqliteLocalStore>,
        Arc<RecordingRemote>,
        ConnectivityHandle,
    ) {
        let store = Arc::new(memory_store().await);
        let remote = Arc::new(RecordingRemote::new());
        let (handle, monitor) = ConnectivityMonitor::channel(online);
        let repository = TripRepository::new(store.clone(), remote.clone(), monitor);
        (repository, store, remote, handle)
    }

    fn trip(id: &str, title: &str) -> Trip {
        let mut trip = Trip::new(
            title.to_string(),
            "Porto".to_string(),
            1_720_000_000_000,
            1_720_600_000_000,
            "organiser-1".to_string(),
        );
        trip.id = id.to_string();
        trip
    }

    #[tokio::test]
    async fn offline_save_is_local_only() {
        let (repository, store, remote, _handle) = setup(false).await;

        repository.save_trip(&trip("t1", "Summer")).await.unwrap();

        assert!(store.get_trip("t1").await.unwrap().is_some());
        assert!(remote.set_calls().is_empty());
    }

    #[tokio::test]
    async fn online_save_mirrors_to_remote() {
        let (repository, store, remote, _handle) = setup(true).await;

        repository.save_trip(&trip("t1", "Summer")).await.unwrap();

        assert!(store.get_trip("t1").await.unwrap().is_some());
        let calls = remote.set_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "trips/t1");
    }

    #[tokio::test]
    async fn remote_write_failure_is_swallowed() {
        let (repository, store, remote, _handle) = setup(true).await;
        remote.fail_writes(true);

        repository.save_trip(&trip("t1", "Summer")).await.unwrap();
        assert!(store.get_trip("t1").await.unwrap().is_some());

        // No retry once connectivity-side failures clear.
        remote.fail_writes(false);
        assert!(remote.set_calls().is_empty());
    }

    #[tokio::test]
    async fn watch_source_is_fixed_at_subscribe_time() {
        let (repository, store, remote, handle) = setup(false).await;
        let mut stream = repository.watch_trip("t1");
        assert_eq!(stream.next().await.unwrap().unwrap(), None);

        // Going online later must not re-route the live stream.
        handle.set_available(true);
        remote
            .backend()
            .set(
                &CollectionPath::trips().doc("t1"),
                wire::encode(&trip("t1", "Remote")).unwrap(),
            )
            .await
            .unwrap();
        let waited = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
        assert!(waited.is_err(), "local-routed stream saw a remote write");

        store.upsert_trip(&trip("t1", "Local")).await.unwrap();
        let seen = stream.next().await.unwrap().unwrap().unwrap();
        assert_eq!(seen.title, "Local");
    }

    #[tokio::test]
    async fn all_trips_prefers_non_empty_remote() {
        let (repository, store, remote, _handle) = setup(false).await;
        store.upsert_trip(&trip("local", "Cached")).await.unwrap();

        let mut stream = repository.watch_all_trips();
        // The empty initial remote snapshot may land before the local query.
        let mut first = stream.next().await.unwrap().unwrap();
        if first.is_empty() {
            first = stream.next().await.unwrap().unwrap();
        }
        assert_eq!(first[0].id, "local");

        // The remote feed stays attached even though the read started
        // offline, so fresh remote data takes over without re-subscribing.
        remote
            .backend()
            .set(
                &CollectionPath::trips().doc("fresh"),
                wire::encode(&trip("fresh", "Live")).unwrap(),
            )
            .await
            .unwrap();
        let next = stream.next().await.unwrap().unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "fresh");
    }

    #[tokio::test]
    async fn join_trip_grows_the_set_once() {
        let (repository, _store, remote, _handle) = setup(true).await;

        let mut t = trip("t1", "Summer");
        t.participant_ids = vec!["u1".into()];
        repository.save_trip(&t).await.unwrap();

        let joined = repository.join_trip("t1", "u2").await.unwrap();
        assert_eq!(joined.participant_ids, vec!["u1".to_string(), "u2".to_string()]);

        let writes_after_join = remote.set_calls().len();
        let again = repository.join_trip("t1", "u2").await.unwrap();
        assert_eq!(again.participant_ids.len(), 2);
        assert_eq!(remote.set_calls().len(), writes_after_join);
    }

    #[tokio::test]
    async fn join_trip_unknown_id_is_not_found() {
        let (repository, _store, _remote, _handle) = setup(false).await;
        let err = repository.join_trip("missing", "u1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
