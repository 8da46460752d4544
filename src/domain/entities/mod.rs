pub mod activity;
pub mod budget_item;
pub mod decode;
pub mod message;
pub mod notification;
pub mod session;
pub mod trip;
pub mod user;

pub use activity::{Activity, ActivityCategory};
pub use budget_item::{BudgetCategory, BudgetItem};
pub use message::{sort_by_timestamp, Message, MessageType};
pub use notification::{Notification, NotificationType};
pub use session::Session;
pub use trip::{ItineraryEntry, Trip};
pub use user::{Role, User};

/// Implemented by every remotely-stored entity so generic wire decoding can
/// read the id and backfill it from the storage key when the payload lacks one.
pub trait Entity {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}
