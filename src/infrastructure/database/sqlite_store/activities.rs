use async_trait::async_trait;

use super::mapper::{format_date, map_activity_row, to_json_text};
use super::queries::{
    DELETE_ACTIVITY, SELECT_ACTIVITIES_BY_TRIP, SELECT_ACTIVITY_BY_ID, UPSERT_ACTIVITY,
};
use super::watch::{self, Table};
use super::SqliteLocalStore;
use crate::application::ports::local_store::{ActivityStore, LiveStream};
use crate::domain::entities::Activity;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

async fn fetch_activity(pool: &ConnectionPool, id: &str) -> Result<Option<Activity>, AppError> {
    let row = sqlx::query(SELECT_ACTIVITY_BY_ID)
        .bind(id)
        .fetch_optional(pool.get_pool())
        .await?;

    match row {
        Some(row) => Ok(Some(map_activity_row(&row)?)),
        None => Ok(None),
    }
}

async fn fetch_activities_for_trip(
    pool: &ConnectionPool,
    trip_id: &str,
) -> Result<Vec<Activity>, AppError> {
    let rows = sqlx::query(SELECT_ACTIVITIES_BY_TRIP)
        .bind(trip_id)
        .fetch_all(pool.get_pool())
        .await?;

    let mut activities = Vec::with_capacity(rows.len());
    for row in rows {
        activities.push(map_activity_row(&row)?);
    }
    Ok(activities)
}

#[async_trait]
impl ActivityStore for SqliteLocalStore {
    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        sqlx::query(UPSERT_ACTIVITY)
            .bind(&activity.id)
            .bind(&activity.trip_id)
            .bind(&activity.title)
            .bind(format_date(&activity.date))
            .bind(&activity.time)
            .bind(&activity.location)
            .bind(&activity.description)
            .bind(to_json_text(&activity.assigned_to))
            .bind(activity.cost)
            .bind(activity.category.as_str())
            .bind(activity.created_at)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Activities);
        Ok(())
    }

    async fn delete_activity(&self, id: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_ACTIVITY)
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Activities);
        Ok(())
    }

    async fn get_activity(&self, id: &str) -> Result<Option<Activity>, AppError> {
        fetch_activity(&self.pool, id).await
    }

    fn watch_activities_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Activity>> {
        let pool = self.pool.clone();
        let trip_id = trip_id.to_string();
        watch::live_query(&self.tables, Table::Activities, move || {
            let pool = pool.clone();
            let trip_id = trip_id.clone();
            async move { fetch_activities_for_trip(&pool, &trip_id).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::memory_store;
    use crate::application::ports::local_store::ActivityStore;
    use crate::domain::entities::{Activity, ActivityCategory};
    use chrono::NaiveDate;
    use futures::StreamExt;

    fn activity(id: &str, trip_id: &str, day: u32, time: Option<&str>) -> Activity {
        let mut activity = Activity::new(
            trip_id.to_string(),
            format!("activity {id}"),
            NaiveDate::from_ymd_opt(2026, 7, day).unwrap(),
        );
        activity.id = id.to_string();
        activity.time = time.map(str::to_string);
        activity
    }

    #[tokio::test]
    async fn assigned_to_round_trips_through_json_column() {
        let store = memory_store().await;

        let mut a = activity("a1", "t1", 1, None);
        a.assigned_to = vec!["u1".into(), "u2".into()];
        a.category = ActivityCategory::Food;
        store.upsert_activity(&a).await.unwrap();

        let stored = store.get_activity("a1").await.unwrap().unwrap();
        assert_eq!(stored, a);
    }

    #[tokio::test]
    async fn watch_orders_by_date_then_time() {
        let store = memory_store().await;

        store
            .upsert_activity(&activity("late", "t1", 2, Some("18:00")))
            .await
            .unwrap();
        store
            .upsert_activity(&activity("early", "t1", 2, Some("09:00")))
            .await
            .unwrap();
        store
            .upsert_activity(&activity("first", "t1", 1, None))
            .await
            .unwrap();
        store
            .upsert_activity(&activity("elsewhere", "t2", 1, None))
            .await
            .unwrap();

        let mut stream = store.watch_activities_for_trip("t1");
        let activities = stream.next().await.unwrap().unwrap();
        let ids: Vec<&str> = activities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "early", "late"]);
    }
}
