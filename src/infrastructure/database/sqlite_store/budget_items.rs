use async_trait::async_trait;

use super::mapper::{format_date, map_budget_item_row, to_json_text};
use super::queries::{
    DELETE_BUDGET_ITEM, SELECT_BUDGET_ITEMS_BY_TRIP, SELECT_BUDGET_ITEM_BY_ID, UPSERT_BUDGET_ITEM,
};
use super::watch::{self, Table};
use super::SqliteLocalStore;
use crate::application::ports::local_store::{BudgetItemStore, LiveStream};
use crate::domain::entities::BudgetItem;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

async fn fetch_budget_item(pool: &ConnectionPool, id: &str) -> Result<Option<BudgetItem>, AppError> {
    let row = sqlx::query(SELECT_BUDGET_ITEM_BY_ID)
        .bind(id)
        .fetch_optional(pool.get_pool())
        .await?;

    match row {
        Some(row) => Ok(Some(map_budget_item_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_budget_for_trip(
    pool: &ConnectionPool,
    trip_id: &str,
) -> Result<Vec<BudgetItem>, AppError> {
    let rows = sqlx::query(SELECT_BUDGET_ITEMS_BY_TRIP)
        .bind(trip_id)
        .fetch_all(pool.get_pool())
        .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        items.push(map_budget_item_row(&row)?);
    }
    Ok(items)
}

#[async_trait]
impl BudgetItemStore for SqliteLocalStore {
    async fn upsert_budget_item(&self, item: &BudgetItem) -> Result<(), AppError> {
        sqlx::query(UPSERT_BUDGET_ITEM)
            .bind(&item.id)
            .bind(&item.trip_id)
            .bind(&item.title)
            .bind(item.amount)
            .bind(item.category.as_str())
            .bind(&item.paid_by)
            .bind(to_json_text(&item.shared_with))
            .bind(format_date(&item.date))
            .bind(&item.description)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::BudgetItems);
        Ok(())
    }

    async fn delete_budget_item(&self, id: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_BUDGET_ITEM)
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::BudgetItems);
        Ok(())
    }

    async fn get_budget_item(&self, id: &str) -> Result<Option<BudgetItem>, AppError> {
        fetch_budget_item(&self.pool, id).await
    }

    fn watch_budget_for_trip(&self, trip_id: &str) -> LiveStream<Vec<BudgetItem>> {
        let pool = self.pool.clone();
        let trip_id = trip_id.to_string();
        watch::live_query(&self.tables, Table::BudgetItems, move || {
            let pool = pool.clone();
            let trip_id = trip_id.clone();
            async move { fetch_budget_for_trip(&pool, &trip_id).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory_store;
    use crate::application::ports::local_store::BudgetItemStore;
    use crate::domain::entities::{BudgetCategory, BudgetItem};
    use chrono::NaiveDate;
    use futures::StreamExt;

    fn item(id: &str, trip_id: &str, day: u32, amount: f64) -> BudgetItem {
        let mut item = BudgetItem::new(
            trip_id.to_string(),
            format!("expense {id}"),
            amount,
            "u1".to_string(),
            NaiveDate::from_ymd_opt(2026, 7, day).unwrap(),
        );
        item.id = id.to_string();
        item
    }

    #[tokio::test]
    async fn shared_with_round_trips_through_json_column() {
        let store = memory_store().await;

        let mut expense = item("b1", "t1", 3, 120.0);
        expense.shared_with = vec!["u1".into(), "u2".into(), "u3".into()];
        expense.category = BudgetCategory::Food;
        store.upsert_budget_item(&expense).await.unwrap();

        let stored = store.get_budget_item("b1").await.unwrap().unwrap();
        assert_eq!(stored, expense);
    }

    #[tokio::test]
    async fn watch_orders_by_date() {
        let store = memory_store().await;

        store.upsert_budget_item(&item("late", "t1", 9, 10.0)).await.unwrap();
        store.upsert_budget_item(&item("early", "t1", 2, 20.0)).await.unwrap();
        store.upsert_budget_item(&item("other", "t2", 1, 30.0)).await.unwrap();

        let mut stream = store.watch_budget_for_trip("t1");
        let items = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        store.delete_budget_item("early").await.unwrap();
        let items = stream.next().await.unwrap().unwrap();
        assert_eq!(items.len(), 1);
    }
}
