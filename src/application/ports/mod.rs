pub mod local_store;
pub mod remote_store;

pub use local_store::{
    ActivityStore, BudgetItemStore, LiveStream, LocalStore, MessageStore, NotificationStore,
    TripStore, UserStore,
};
pub use remote_store::{
    CollectionPath, DocumentPath, DocumentStream, RemoteDocument, RemoteFilter, RemoteSnapshot,
    RemoteStore, SnapshotStream,
};
