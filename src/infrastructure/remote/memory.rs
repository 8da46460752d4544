use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use crate::application::ports::remote_store::{
    CollectionPath, DocumentPath, DocumentStream, RemoteDocument, RemoteFilter, RemoteSnapshot,
    RemoteStore, SnapshotStream,
};
use crate::shared::error::AppError;

type DocumentTree = HashMap<String, BTreeMap<String, Value>>;

/// In-process reference backend for the remote store port: a document tree
/// plus a broadcast channel of "collection touched" ticks. Subscribers
/// re-materialize their snapshot per matching tick, which keeps lagged
/// receivers correct (they skip straight to the latest state).
pub struct MemoryRemoteStore {
    documents: Arc<RwLock<DocumentTree>>,
    ticks: broadcast::Sender<CollectionPath>,
    listeners: Arc<AtomicUsize>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        let (ticks, _) = broadcast::channel(256);
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            ticks,
            listeners: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of live collection and document subscriptions.
    pub fn active_listeners(&self) -> usize {
        self.listeners.load(Ordering::SeqCst)
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

struct ListenerGuard {
    counter: Arc<AtomicUsize>,
}

impl ListenerGuard {
    fn register(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            counter: counter.clone(),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn materialize(
    documents: &Arc<RwLock<DocumentTree>>,
    path: &CollectionPath,
    filter: Option<&RemoteFilter>,
) -> RemoteSnapshot {
    let tree = documents.read().await;
    let mut snapshot = RemoteSnapshot::new();
    if path.is_group() {
        for (collection, docs) in tree.iter() {
            if path.matches(&CollectionPath::new(collection)) {
                collect_into(&mut snapshot, docs, filter);
            }
        }
        snapshot.sort_by(|a, b| a.key.cmp(&b.key));
    } else if let Some(docs) = tree.get(&path.to_string()) {
        collect_into(&mut snapshot, docs, filter);
    }
    snapshot
}

fn collect_into(
    snapshot: &mut RemoteSnapshot,
    docs: &BTreeMap<String, Value>,
    filter: Option<&RemoteFilter>,
) {
    for (key, value) in docs {
        if filter.map_or(true, |f| f.matches(value)) {
            snapshot.push(RemoteDocument {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }
}

async fn read_document(documents: &Arc<RwLock<DocumentTree>>, path: &DocumentPath) -> Option<Value> {
    let tree = documents.read().await;
    tree.get(&path.collection.to_string())
        .and_then(|docs| docs.get(&path.key))
        .cloned()
}

struct CollectionSub {
    documents: Arc<RwLock<DocumentTree>>,
    ticks: broadcast::Receiver<CollectionPath>,
    path: CollectionPath,
    filter: Option<RemoteFilter>,
    last: Option<RemoteSnapshot>,
    _guard: ListenerGuard,
}

struct DocumentSub {
    documents: Arc<RwLock<DocumentTree>>,
    ticks: broadcast::Receiver<CollectionPath>,
    path: DocumentPath,
    last: Option<Option<Value>>,
    _guard: ListenerGuard,
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    fn subscribe(&self, path: &CollectionPath, filter: Option<RemoteFilter>) -> SnapshotStream {
        let state = CollectionSub {
            documents: self.documents.clone(),
            ticks: self.ticks.subscribe(),
            path: path.clone(),
            filter,
            last: None,
            _guard: ListenerGuard::register(&self.listeners),
        };
        futures::stream::unfold(state, |mut state| async move {
            loop {
                if state.last.is_some() {
                    match state.ticks.recv().await {
                        Ok(touched) => {
                            if !state.path.matches(&touched) {
                                continue;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
                let snapshot =
                    materialize(&state.documents, &state.path, state.filter.as_ref()).await;
                if state.last.as_ref() == Some(&snapshot) {
                    continue;
                }
                state.last = Some(snapshot.clone());
                return Some((Ok(snapshot), state));
            }
        })
        .boxed()
    }

    fn subscribe_document(&self, path: &DocumentPath) -> DocumentStream {
        let state = DocumentSub {
            documents: self.documents.clone(),
            ticks: self.ticks.subscribe(),
            path: path.clone(),
            last: None,
            _guard: ListenerGuard::register(&self.listeners),
        };
        futures::stream::unfold(state, |mut state| async move {
            loop {
                if state.last.is_some() {
                    match state.ticks.recv().await {
                        Ok(touched) => {
                            if !state.path.collection.matches(&touched) {
                                continue;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
                let value = read_document(&state.documents, &state.path).await;
                if state.last.as_ref() == Some(&value) {
                    continue;
                }
                state.last = Some(value.clone());
                return Some((Ok(value), state));
            }
        })
        .boxed()
    }

    async fn get(
        &self,
        path: &CollectionPath,
        filter: Option<RemoteFilter>,
    ) -> Result<RemoteSnapshot, AppError> {
        Ok(materialize(&self.documents, path, filter.as_ref()).await)
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, AppError> {
        Ok(read_document(&self.documents, path).await)
    }

    async fn set(&self, path: &DocumentPath, value: Value) -> Result<(), AppError> {
        if path.collection.is_group() {
            return Err(AppError::InvalidInput(format!(
                "cannot write through collection group path {path}"
            )));
        }
        {
            let mut tree = self.documents.write().await;
            tree.entry(path.collection.to_string())
                .or_default()
                .insert(path.key.clone(), value);
        }
        let _ = self.ticks.send(path.collection.clone());
        Ok(())
    }

    async fn remove(&self, path: &DocumentPath) -> Result<(), AppError> {
        if path.collection.is_group() {
            return Err(AppError::InvalidInput(format!(
                "cannot delete through collection group path {path}"
            )));
        }
        let removed = {
            let mut tree = self.documents.write().await;
            tree.get_mut(&path.collection.to_string())
                .and_then(|docs| docs.remove(&path.key))
        };
        if removed.is_some() {
            let _ = self.ticks.send(path.collection.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    #[tokio::test]
    async fn subscribe_pushes_whole_snapshots() {
        let store = MemoryRemoteStore::new();
        let trips = CollectionPath::trips();
        store
            .set(&trips.doc("t1"), json!({"title": "A"}))
            .await
            .unwrap();

        let mut stream = store.subscribe(&trips, None);
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        store
            .set(&trips.doc("t2"), json!({"title": "B"}))
            .await
            .unwrap();
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn filtered_subscription_ignores_non_members() {
        let store = MemoryRemoteStore::new();
        let trips = CollectionPath::trips();
        let filter = RemoteFilter::field_equals("organiserId", "u1");

        let mut stream = store.subscribe(&trips, Some(filter));
        assert!(stream.next().await.unwrap().unwrap().is_empty());

        store
            .set(&trips.doc("other"), json!({"organiserId": "u2"}))
            .await
            .unwrap();
        assert!(stream.next().now_or_never().is_none());

        store
            .set(&trips.doc("mine"), json!({"organiserId": "u1"}))
            .await
            .unwrap();
        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].key, "mine");
    }

    #[tokio::test]
    async fn document_subscription_suppresses_duplicates() {
        let store = MemoryRemoteStore::new();
        let path = CollectionPath::users().doc("u1");

        let mut stream = store.subscribe_document(&path);
        assert_eq!(stream.next().await.unwrap().unwrap(), None);

        store.set(&path, json!({"email": "a@b.c"})).await.unwrap();
        assert!(stream.next().await.unwrap().unwrap().is_some());

        store.set(&path, json!({"email": "a@b.c"})).await.unwrap();
        assert!(stream.next().now_or_never().is_none());

        store.remove(&path).await.unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn collection_group_merges_matching_collections() {
        let store = MemoryRemoteStore::new();
        store
            .set(
                &CollectionPath::trip_messages("t1").doc("m1"),
                json!({"content": "one"}),
            )
            .await
            .unwrap();
        store
            .set(
                &CollectionPath::trip_messages("t2").doc("m2"),
                json!({"content": "two"}),
            )
            .await
            .unwrap();
        store
            .set(&CollectionPath::trips().doc("t1"), json!({"title": "A"}))
            .await
            .unwrap();

        let mut stream = store.subscribe(&CollectionPath::all_trip_messages(), None);
        let snapshot = stream.next().await.unwrap().unwrap();
        let keys: Vec<&str> = snapshot.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["m1", "m2"]);

        store
            .set(
                &CollectionPath::trip_messages("t3").doc("m3"),
                json!({"content": "three"}),
            )
            .await
            .unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dropping_a_stream_releases_the_listener() {
        let store = MemoryRemoteStore::new();
        let stream = store.subscribe(&CollectionPath::trips(), None);
        let doc_stream = store.subscribe_document(&CollectionPath::users().doc("u1"));
        assert_eq!(store.active_listeners(), 2);

        drop(stream);
        assert_eq!(store.active_listeners(), 1);
        drop(doc_stream);
        assert_eq!(store.active_listeners(), 0);
    }

    #[tokio::test]
    async fn group_paths_reject_writes() {
        let store = MemoryRemoteStore::new();
        let path = CollectionPath::all_trip_messages().doc("m1");
        assert!(store.set(&path, json!({})).await.is_err());
        assert!(store.remove(&path).await.is_err());
    }
}
