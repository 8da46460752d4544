use async_trait::async_trait;

use super::ConnectionPool;
use super::Store;
use crate::shared::error::AppError;

mod activities;
mod budget_items;
mod mapper;
mod messages;
mod notifications;
mod queries;
mod trips;
mod users;
mod watch;

/// SQLite implementation of the per-entity local store ports. Mutations tick
/// a shared table-watch channel so live queries know when to re-run.
pub struct SqliteLocalStore {
    pool: ConnectionPool,
    tables: watch::TableWatch,
}

impl SqliteLocalStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            tables: watch::TableWatch::new(),
        }
    }
}

#[async_trait]
impl Store for SqliteLocalStore {
    async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1").fetch_one(self.pool.get_pool()).await;
        Ok(result.is_ok())
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteLocalStore {
    let pool = ConnectionPool::from_memory().await.expect("in-memory pool");
    let store = SqliteLocalStore::new(pool);
    store.initialize().await.expect("migrations");
    store
}
