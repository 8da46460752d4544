use async_trait::async_trait;

use super::mapper::{map_trip_row, to_json_text};
use super::queries::{DELETE_TRIP, SELECT_ALL_TRIPS, SELECT_TRIP_BY_ID, UPSERT_TRIP};
use super::watch::{self, Table};
use super::SqliteLocalStore;
use crate::application::ports::local_store::{LiveStream, TripStore};
use crate::domain::entities::Trip;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;

pub(super) async fn fetch_trip(pool: &ConnectionPool, id: &str) -> Result<Option<Trip>, AppError> {
    let row = sqlx::query(SELECT_TRIP_BY_ID)
        .bind(id)
        .fetch_optional(pool.get_pool())
        .await?;

    match row {
        Some(row) => Ok(Some(map_trip_row(&row)?)),
        None => Ok(None),
    }
}

pub(super) async fn fetch_all_trips(pool: &ConnectionPool) -> Result<Vec<Trip>, AppError> {
    let rows = sqlx::query(SELECT_ALL_TRIPS)
        .fetch_all(pool.get_pool())
        .await?;

    let mut trips = Vec::with_capacity(rows.len());
    for row in rows {
        trips.push(map_trip_row(&row)?);
    }
    Ok(trips)
}

#[async_trait]
impl TripStore for SqliteLocalStore {
    async fn upsert_trip(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(UPSERT_TRIP)
            .bind(&trip.id)
            .bind(&trip.title)
            .bind(&trip.destination)
            .bind(trip.start_date)
            .bind(trip.end_date)
            .bind(&trip.organiser_id)
            .bind(to_json_text(&trip.participant_ids))
            .bind(trip.budget)
            .bind(trip.spent_amount)
            .bind(to_json_text(&trip.itinerary))
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Trips);
        Ok(())
    }

    async fn delete_trip(&self, id: &str) -> Result<(), AppError> {
        sqlx::query(DELETE_TRIP)
            .bind(id)
            .execute(self.pool.get_pool())
            .await?;

        self.tables.notify(Table::Trips);
        Ok(())
    }

    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, AppError> {
        fetch_trip(&self.pool, id).await
    }

    fn watch_trip(&self, id: &str) -> LiveStream<Option<Trip>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        watch::live_query(&self.tables, Table::Trips, move || {
            let pool = pool.clone();
            let id = id.clone();
            async move { fetch_trip(&pool, &id).await }
        })
    }

    fn watch_all_trips(&self) -> LiveStream<Vec<Trip>> {
        let pool = self.pool.clone();
        watch::live_query(&self.tables, Table::Trips, move || {
            let pool = pool.clone();
            async move { fetch_all_trips(&pool).await }
        })
    }
}
