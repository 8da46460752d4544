use std::sync::Arc;

use futures::StreamExt;

use super::routing::{self, SourceSelection};
use crate::application::ports::local_store::{LiveStream, NotificationStore, UserStore};
use crate::application::ports::remote_store::{CollectionPath, RemoteStore};
use crate::domain::entities::{Notification, Trip, User};
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct NotificationRepository {
    local: Arc<dyn NotificationStore>,
    users: Arc<dyn UserStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

impl NotificationRepository {
    pub fn new(
        local: Arc<dyn NotificationStore>,
        users: Arc<dyn UserStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            users,
            remote,
            connectivity,
        }
    }

    pub fn watch_for_user(&self, user_id: &str) -> LiveStream<Vec<Notification>> {
        match routing::select_source(&self.connectivity, "notifications") {
            SourceSelection::Remote => self
                .remote
                .subscribe(&CollectionPath::notifications(user_id), None)
                .map(|item| item.map(|snapshot| wire::decode_snapshot(&snapshot)))
                .boxed(),
            SourceSelection::Local => self.local.watch_notifications_for_user(user_id),
        }
    }

    pub async fn save_notification(&self, notification: &Notification) -> Result<(), AppError> {
        self.local.upsert_notification(notification).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        let path = CollectionPath::notifications(&notification.user_id).doc(&notification.id);
        match wire::encode(notification) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(notification_id = %notification.id, error = %err, "remote notification mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(notification_id = %notification.id, error = %err, "could not encode notification for remote");
            }
        }
        Ok(())
    }

    pub async fn mark_read(&self, id: &str) -> Result<(), AppError> {
        let mut notification = self
            .local
            .get_notification(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("notification {id}")))?;
        if notification.is_read {
            return Ok(());
        }
        notification.mark_read();
        self.save_notification(&notification).await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<(), AppError> {
        let notification = self.local.get_notification(id).await?;
        self.local.delete_notification(id).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        if let Some(notification) = notification {
            let path = CollectionPath::notifications(&notification.user_id).doc(id);
            if let Err(err) = self.remote.remove(&path).await {
                tracing::warn!(notification_id = id, error = %err, "remote notification delete failed; local copy removed");
            }
        }
        Ok(())
    }

    /// Fans one trip-created notification out to every known user except the
    /// organiser. At-least-once and non-atomic: the first failed write stops
    /// the loop, leaving a notified prefix behind. Returns how many users
    /// were notified.
    pub async fn broadcast_trip_created(&self, trip: &Trip) -> Result<usize, AppError> {
        let users = self.known_users().await?;
        let mut notified = 0usize;
        for user in users {
            if user.id == trip.organiser_id {
                continue;
            }
            let notification = Notification::trip_created(user.id.clone(), trip);
            if let Err(err) = self.save_notification(&notification).await {
                tracing::warn!(user_id = %user.id, error = %err, "trip broadcast stopped early");
                break;
            }
            notified += 1;
        }
        tracing::info!(trip_id = %trip.id, notified, "trip creation broadcast finished");
        Ok(notified)
    }

    async fn known_users(&self) -> Result<Vec<User>, AppError> {
        if self.connectivity.is_available() {
            match self.remote.get(&CollectionPath::users(), None).await {
                Ok(snapshot) => return Ok(wire::decode_snapshot(&snapshot)),
                Err(err) => {
                    tracing::warn!(error = %err, "remote user enumeration failed; falling back to local");
                }
            }
        }
        self.users.all_users().await
    }
}
