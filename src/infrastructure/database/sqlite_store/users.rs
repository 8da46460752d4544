use async_trait::async_trait;

use super::mapper::map_user_row;
use super::queries::{SELECT_ALL_USERS, SELECT_USER_BY_ID, UPSERT_USER};
use super::watch::Table;
use super::SqliteLocalStore;
use crate::application::ports::local_store::UserStore;
use crate::domain::entities::User;
use crate::shared::error::AppError;

#[async_trait]
impl UserStore for SqliteLocalStore {
    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(UPSERT_USER)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.display_name)
            .bind(user.role.as_str())
            .bind(&user.photo_url)
            .bind(&user.phone)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Users);
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(SELECT_USER_BY_ID)
            .bind(id)
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => Ok(Some(map_user_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn all_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(SELECT_ALL_USERS)
            .fetch_all(self.pool.get_pool())
            .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(map_user_row(&row)?);
        }
        Ok(users)
    }
}
