use async_trait::async_trait;

use super::mapper::map_message_row;
use super::queries::{
    DELETE_MESSAGE, SELECT_MESSAGES_BY_TRIP, SELECT_MESSAGE_BY_ID, SELECT_PRIVATE_MESSAGES,
    UPSERT_MESSAGE,
};
use super::watch::{self, Table};
use super::SqliteLocalStore;
use crate::application::ports::local_store::{LiveStream, MessageStore};
use crate::domain::entities::Message;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

async fn fetch_message(pool: &ConnectionPool, id: &str) -> Result<Option<Message>, AppError> {
    let row = sqlx::query(SELECT_MESSAGE_BY_ID)
        .bind(id)
        .fetch_optional(pool.get_pool())
        .await?;

    match row {
        Some(row) => Ok(Some(map_message_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_messages_for_trip(
    pool: &ConnectionPool,
    trip_id: &str,
) -> Result<Vec<Message>, AppError> {
    let rows = sqlx::query(SELECT_MESSAGES_BY_TRIP)
        .bind(trip_id)
        .fetch_all(pool.get_pool())
        .await?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        messages.push(map_message_row(&row)?);
    }
    Ok(messages)
}

async fn fetch_private_messages(
    pool: &ConnectionPool,
    user_id: &str,
    peer_id: &str,
) -> Result<Vec<Message>, AppError> {
    let rows = sqlx::query(SELECT_PRIVATE_MESSAGES)
        .bind(user_id)
        .bind(peer_id)
        .fetch_all(pool.get_pool())
        .await?;

    let mut messages = Vec::with_capacity(rows.len());
    for row in rows {
        messages.push(map_message_row(&row)?);
    }
    Ok(messages)
}

#[async_trait]
impl MessageStore for SqliteLocalStore {
    async fn upsert_message(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(UPSERT_MESSAGE)
            .bind(&message.id)
            .bind(&message.trip_id)
            .bind(&message.sender_id)
            .bind(&message.receiver_id)
            .bind(&message.content)
            .bind(message.message_type.as_str())
            .bind(message.timestamp)
            .bind(message.is_read)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Messages);
        Ok(())
    }

    async fn delete_message(&self, id: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_MESSAGE)
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Messages);
        Ok(())
    }

    async fn get_message(&self, id: &str) -> Result<Option<Message>, AppError> {
        fetch_message(&self.pool, id).await
    }

    fn watch_messages_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Message>> {
        let pool = self.pool.clone();
        let trip_id = trip_id.to_string();
        watch::live_query(&self.tables, Table::Messages, move || {
            let pool = pool.clone();
            let trip_id = trip_id.clone();
            async move { fetch_messages_for_trip(&pool, &trip_id).await }
        })
    }

    fn watch_private_messages(&self, user_id: &str, peer_id: &str) -> LiveStream<Vec<Message>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        let peer_id = peer_id.to_string();
        watch::live_query(&self.tables, Table::Messages, move || {
            let pool = pool.clone();
            let user_id = user_id.clone();
            let peer_id = peer_id.clone();
            async move { fetch_private_messages(&pool, &user_id, &peer_id).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory_store;
    use crate::application::ports::local_store::MessageStore;
    use crate::domain::entities::Message;
    use futures::StreamExt;

    fn group_message(id: &str, trip_id: &str, sender: &str, at: i64) -> Message {
        let mut message = Message::group(trip_id.into(), sender.into(), format!("msg {id}"));
        message.id = id.to_string();
        message.timestamp = at;
        message
    }

    fn private_message(id: &str, sender: &str, receiver: &str, at: i64) -> Message {
        let mut message = Message::private(sender.into(), receiver.into(), format!("msg {id}"));
        message.id = id.to_string();
        message.timestamp = at;
        message
    }

    #[tokio::test]
    async fn trip_messages_come_back_in_send_order() {
        let store = memory_store().await;

        store
            .upsert_message(&group_message("m2", "t1", "u1", 200))
            .await
            .unwrap();
        store
            .upsert_message(&group_message("m1", "t1", "u2", 100))
            .await
            .unwrap();
        store
            .upsert_message(&group_message("other", "t2", "u1", 50))
            .await
            .unwrap();

        let mut stream = store.watch_messages_for_trip("t1");
        let messages = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn private_conversation_covers_both_directions() {
        let store = memory_store().await;

        store
            .upsert_message(&private_message("p1", "alice", "bob", 10))
            .await
            .unwrap();
        store
            .upsert_message(&private_message("p2", "bob", "alice", 20))
            .await
            .unwrap();
        store
            .upsert_message(&private_message("noise", "alice", "carol", 30))
            .await
            .unwrap();
        store
            .upsert_message(&group_message("g1", "t1", "alice", 40))
            .await
            .unwrap();

        let mut stream = store.watch_private_messages("alice", "bob");
        let messages = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn mark_read_is_a_replace() {
        let store = memory_store().await;

        let mut message = group_message("m1", "t1", "u1", 100);
        store.upsert_message(&message).await.unwrap();

        message.mark_read();
        store.upsert_message(&message).await.unwrap();

        let stored = store.get_message("m1").await.unwrap().unwrap();
        assert!(stored.is_read);
    }
}
