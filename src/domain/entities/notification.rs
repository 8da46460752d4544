use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Entity, Trip};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationType {
    TripCreated,
    TripUpdated,
    ActivityAdded,
    BudgetUpdated,
    NewMessage,
    #[default]
    General,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::TripCreated => "trip_created",
            NotificationType::TripUpdated => "trip_updated",
            NotificationType::ActivityAdded => "activity_added",
            NotificationType::BudgetUpdated => "budget_updated",
            NotificationType::NewMessage => "new_message",
            NotificationType::General => "general",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "trip_created" => NotificationType::TripCreated,
            "trip_updated" => NotificationType::TripUpdated,
            "activity_added" => NotificationType::ActivityAdded,
            "budget_updated" => NotificationType::BudgetUpdated,
            "new_message" => NotificationType::NewMessage,
            _ => NotificationType::General,
        }
    }
}

impl Serialize for NotificationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NotificationType::parse(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(default, rename = "type")]
    pub notification_type: NotificationType,
    pub related_trip_id: Option<String>,
    pub related_activity_id: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, rename = "read")]
    pub is_read: bool,
}

impl Notification {
    pub fn new(user_id: String, title: String, message: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            title,
            message,
            notification_type: NotificationType::General,
            related_trip_id: None,
            related_activity_id: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_read: false,
        }
    }

    pub fn trip_created(user_id: String, trip: &Trip) -> Self {
        let mut notification = Self::new(
            user_id,
            "New trip".to_string(),
            format!("A trip to {} has been created", trip.destination),
        );
        notification.notification_type = NotificationType::TripCreated;
        notification.related_trip_id = Some(trip.id.clone());
        notification
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

impl Entity for Notification {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
