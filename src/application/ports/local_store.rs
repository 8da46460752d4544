use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::entities::{Activity, BudgetItem, Message, Notification, Trip, User};
use crate::shared::error::AppError;

/// Live query stream. Emits the current result immediately, then again after
/// each mutation that changes the result; a storage error is the final item.
pub type LiveStream<T> = BoxStream<'static, Result<T, AppError>>;

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn upsert_trip(&self, trip: &Trip) -> Result<(), AppError>;
    async fn delete_trip(&self, id: &str) -> Result<(), AppError>;
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, AppError>;
    fn watch_trip(&self, id: &str) -> LiveStream<Option<Trip>>;
    fn watch_all_trips(&self) -> LiveStream<Vec<Trip>>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError>;
    async fn delete_activity(&self, id: &str) -> Result<(), AppError>;
    async fn get_activity(&self, id: &str) -> Result<Option<Activity>, AppError>;
    fn watch_activities_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Activity>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn upsert_message(&self, message: &Message) -> Result<(), AppError>;
    async fn delete_message(&self, id: &str) -> Result<(), AppError>;
    async fn get_message(&self, id: &str) -> Result<Option<Message>, AppError>;
    fn watch_messages_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Message>>;
    fn watch_private_messages(&self, user_id: &str, peer_id: &str) -> LiveStream<Vec<Message>>;
}

#[async_trait]
pub trait BudgetItemStore: Send + Sync {
    async fn upsert_budget_item(&self, item: &BudgetItem) -> Result<(), AppError>;
    async fn delete_budget_item(&self, id: &str) -> Result<(), AppError>;
    async fn get_budget_item(&self, id: &str) -> Result<Option<BudgetItem>, AppError>;
    fn watch_budget_for_trip(&self, trip_id: &str) -> LiveStream<Vec<BudgetItem>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn upsert_notification(&self, notification: &Notification) -> Result<(), AppError>;
    async fn delete_notification(&self, id: &str) -> Result<(), AppError>;
    async fn get_notification(&self, id: &str) -> Result<Option<Notification>, AppError>;
    fn watch_notifications_for_user(&self, user_id: &str) -> LiveStream<Vec<Notification>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn all_users(&self) -> Result<Vec<User>, AppError>;
}

/// Everything the synchronizer needs in one object.
pub trait LocalStore:
    TripStore + ActivityStore + MessageStore + BudgetItemStore + NotificationStore + UserStore
{
}

impl<T> LocalStore for T where
    T: TripStore + ActivityStore + MessageStore + BudgetItemStore + NotificationStore + UserStore
{
}
