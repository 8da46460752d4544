use std::sync::Arc;

use futures::StreamExt;

use super::routing::{self, SourceSelection};
use crate::application::ports::local_store::{LiveStream, MessageStore};
use crate::application::ports::remote_store::{CollectionPath, RemoteStore};
use crate::domain::entities::{sort_by_timestamp, Message};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct MessageRepository {
    local: Arc<dyn MessageStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

impl MessageRepository {
    pub fn new(
        local: Arc<dyn MessageStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
        }
    }

    /// Timestamp order is applied here on the remote path; the local query
    /// already orders its result.
    pub fn watch_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Message>> {
        match routing::select_source(&self.connectivity, "messages") {
            SourceSelection::Remote => self
                .remote
                .subscribe(&CollectionPath::trip_messages(trip_id), None)
                .map(|item| {
                    item.map(|snapshot| {
                        let mut messages: Vec<Message> = wire::decode_snapshot(&snapshot);
                        sort_by_timestamp(&mut messages);
                        messages
                    })
                })
                .boxed(),
            SourceSelection::Local => self.local.watch_messages_for_trip(trip_id),
        }
    }

    /// Private conversations live only in the local store; the remote path
    /// grammar has no node for them, so no routing decision is made.
    pub fn watch_private(&self, user_id: &str, peer_id: &str) -> LiveStream<Vec<Message>> {
        self.local.watch_private_messages(user_id, peer_id)
    }

    pub async fn send_message(&self, message: &Message) -> Result<(), AppError> {
        self.local.upsert_message(message).await?;
        self.mirror_save(message).await;
        Ok(())
    }

    /// Reads the current message, flips the flag and saves through the
    /// normal write path. Already-read messages are left untouched.
    pub async fn mark_read(&self, id: &str) -> Result<(), AppError> {
        let mut message = self
            .local
            .get_message(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {id}")))?;
        if message.is_read {
            return Ok(());
        }
        message.mark_read();
        self.send_message(&message).await
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), AppError> {
        let message = self.local.get_message(id).await?;
        self.local.delete_message(id).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        if let Some(message) = message {
            if let Some(trip_id) = &message.trip_id {
                let path = CollectionPath::trip_messages(trip_id).doc(id);
                if let Err(err) = self.remote.remove(&path).await {
                    tracing::warn!(message_id = id, error = %err, "remote message delete failed; local copy removed");
                }
            }
        }
        Ok(())
    }

    async fn mirror_save(&self, message: &Message) {
        if message.is_private() || !self.connectivity.is_available() {
            return;
        }
        let trip_id = match &message.trip_id {
            Some(trip_id) => trip_id,
            None => return,
        };
        let path = CollectionPath::trip_messages(trip_id).doc(&message.id);
        match wire::encode(message) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(message_id = %message.id, error = %err, "remote message mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(message_id = %message.id, error = %err, "could not encode message for remote");
            }
        }
    }
}
