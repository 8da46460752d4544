pub mod connection_pool;
pub mod sqlite_store;

pub use connection_pool::ConnectionPool;
pub use sqlite_store::SqliteLocalStore;

use crate::shared::error::AppError;
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    async fn initialize(&self) -> Result<(), AppError>;
    async fn health_check(&self) -> Result<bool, AppError>;
}
