pub mod activities;
pub mod budget;
pub mod messages;
pub mod notifications;
mod routing;
pub mod trips;
pub mod users;

pub use activities::ActivityRepository;
pub use budget::BudgetRepository;
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;
pub use trips::TripRepository;
pub use users::UserRepository;
