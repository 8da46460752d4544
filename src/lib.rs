pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::local_store::{
    ActivityStore, BudgetItemStore, LiveStream, LocalStore, MessageStore, NotificationStore,
    TripStore, UserStore,
};
pub use application::ports::remote_store::{
    CollectionPath, DocumentPath, RemoteDocument, RemoteFilter, RemoteSnapshot, RemoteStore,
};
pub use application::repositories::{
    ActivityRepository, BudgetRepository, MessageRepository, NotificationRepository,
    TripRepository, UserRepository,
};
pub use application::sync::{SyncHandle, Synchronizer};
pub use domain::entities::{
    Activity, ActivityCategory, BudgetCategory, BudgetItem, ItineraryEntry, Message, MessageType,
    Notification, NotificationType, Role, Session, Trip, User,
};
pub use infrastructure::connectivity::{ConnectivityHandle, ConnectivityMonitor};
pub use infrastructure::database::{ConnectionPool, SqliteLocalStore, Store};
pub use infrastructure::remote::MemoryRemoteStore;
pub use shared::{AppConfig, AppError, Result};
pub use state::AppState;
