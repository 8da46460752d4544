use async_trait::async_trait;

use super::mapper::map_notification_row;
use super::queries::{
    DELETE_NOTIFICATION, SELECT_NOTIFICATIONS_BY_USER, SELECT_NOTIFICATION_BY_ID,
    UPSERT_NOTIFICATION,
};
use super::watch::{self, Table};
use super::SqliteLocalStore;
use crate::application::ports::local_store::{LiveStream, NotificationStore};
use crate::domain::entities::Notification;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

async fn fetch_notification(
    pool: &ConnectionPool,
    id: &str,
) -> Result<Option<Notification>, AppError> {
    let row = sqlx::query(SELECT_NOTIFICATION_BY_ID)
        .bind(id)
        .fetch_optional(pool.get_pool())
        .await?;

    match row {
        Some(row) => Ok(Some(map_notification_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_notifications_for_user(
    pool: &ConnectionPool,
    user_id: &str,
) -> Result<Vec<Notification>, AppError> {
    let rows = sqlx::query(SELECT_NOTIFICATIONS_BY_USER)
        .bind(user_id)
        .fetch_all(pool.get_pool())
        .await?;

    let mut notifications = Vec::with_capacity(rows.len());
    for row in rows {
        notifications.push(map_notification_row(&row)?);
    }
    Ok(notifications)
}

#[async_trait]
impl NotificationStore for SqliteLocalStore {
    async fn upsert_notification(&self, notification: &Notification) -> Result<(), AppError> {
        sqlx::query(UPSERT_NOTIFICATION)
            .bind(&notification.id)
            .bind(&notification.user_id)
            .bind(&notification.title)
            .bind(&notification.message)
            .bind(notification.notification_type.as_str())
            .bind(&notification.related_trip_id)
            .bind(&notification.related_activity_id)
            .bind(notification.timestamp)
            .bind(notification.is_read)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Notifications);
        Ok(())
    }

    async fn delete_notification(&self, id: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_NOTIFICATION)
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Notifications);
        Ok(())
    }

    async fn get_notification(&self, id: &str) -> Result<Option<Notification>, AppError> {
        fetch_notification(&self.pool, id).await
    }

    fn watch_notifications_for_user(&self, user_id: &str) -> LiveStream<Vec<Notification>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        watch::live_query(&self.tables, Table::Notifications, move || {
            let pool = pool.clone();
            let user_id = user_id.clone();
            async move { fetch_notifications_for_user(&pool, &user_id).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory_store;
    use crate::application::ports::local_store::NotificationStore;
    use crate::domain::entities::Notification;
    use futures::StreamExt;

    fn notification(id: &str, user_id: &str, at: i64) -> Notification {
        let mut n = Notification::new(user_id.into(), "title".into(), format!("body {id}"));
        n.id = id.to_string();
        n.timestamp = at;
        n
    }

    #[tokio::test]
    async fn watch_returns_newest_first_per_user() {
        let store = memory_store().await;

        store.upsert_notification(&notification("old", "u1", 100)).await.unwrap();
        store.upsert_notification(&notification("new", "u1", 300)).await.unwrap();
        store.upsert_notification(&notification("other", "u2", 200)).await.unwrap();

        let mut stream = store.watch_notifications_for_user("u1");
        let notifications = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = notifications.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn mark_read_survives_replace() {
        let store = memory_store().await;

        let mut n = notification("n1", "u1", 100);
        store.upsert_notification(&n).await.unwrap();

        n.mark_read();
        store.upsert_notification(&n).await.unwrap();

        let stored = store.get_notification("n1").await.unwrap().unwrap();
        assert!(stored.is_read);
    }
}
