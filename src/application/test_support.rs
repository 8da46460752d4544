use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::remote_store::{
    CollectionPath, DocumentPath, DocumentStream, RemoteFilter, RemoteSnapshot, RemoteStore,
    SnapshotStream,
};
use crate::infrastructure::remote::MemoryRemoteStore;
use crate::shared::error::AppError;

/// Remote store double for repository tests: a real in-process backend with a
/// write log and a failure switch on top.
pub(crate) struct RecordingRemote {
    inner: MemoryRemoteStore,
    sets: Mutex<Vec<(String, Value)>>,
    removes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl RecordingRemote {
    pub(crate) fn new() -> Self {
        Self {
            inner: MemoryRemoteStore::new(),
            sets: Mutex::new(Vec::new()),
            removes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_calls(&self) -> Vec<(String, Value)> {
        self.sets.lock().unwrap().clone()
    }

    pub(crate) fn remove_calls(&self) -> Vec<String> {
        self.removes.lock().unwrap().clone()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn backend(&self) -> &MemoryRemoteStore {
        &self.inner
    }
}

#[async_trait]
impl RemoteStore for RecordingRemote {
    fn subscribe(&self, path: &CollectionPath, filter: Option<RemoteFilter>) -> SnapshotStream {
        self.inner.subscribe(path, filter)
    }

    fn subscribe_document(&self, path: &DocumentPath) -> DocumentStream {
        self.inner.subscribe_document(path)
    }

    async fn get(
        &self,
        path: &CollectionPath,
        filter: Option<RemoteFilter>,
    ) -> Result<RemoteSnapshot, AppError> {
        self.inner.get(path, filter).await
    }

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, AppError> {
        self.inner.get_document(path).await
    }

    async fn set(&self, path: &DocumentPath, value: Value) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Remote("injected write failure".to_string()));
        }
        self.sets
            .lock()
            .unwrap()
            .push((path.to_string(), value.clone()));
        self.inner.set(path, value).await
    }

    async fn remove(&self, path: &DocumentPath) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Remote("injected write failure".to_string()));
        }
        self.removes.lock().unwrap().push(path.to_string());
        self.inner.remove(path).await
    }
}
