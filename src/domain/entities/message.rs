use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Text,
    Image,
    System,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::System => "system",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "image" => MessageType::Image,
            "system" => MessageType::System,
            _ => MessageType::Text,
        }
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MessageType::parse(&s))
    }
}

/// A chat message. `trip_id` present means a trip's group chat;
/// absent means a private conversation addressed by `receiver_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub trip_id: Option<String>,
    pub sender_id: String,
    pub receiver_id: Option<String>,
    pub content: String,
    #[serde(default, rename = "type")]
    pub message_type: MessageType,
    pub timestamp: i64,
    #[serde(default, rename = "read")]
    pub is_read: bool,
}

impl Message {
    pub fn group(trip_id: String, sender_id: String, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: Some(trip_id),
            sender_id,
            receiver_id: None,
            content,
            message_type: MessageType::Text,
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_read: false,
        }
    }

    pub fn private(sender_id: String, receiver_id: String, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id: None,
            sender_id,
            receiver_id: Some(receiver_id),
            content,
            message_type: MessageType::Text,
            timestamp: chrono::Utc::now().timestamp_millis(),
            is_read: false,
        }
    }

    pub fn is_private(&self) -> bool {
        self.trip_id.is_none()
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

impl Entity for Message {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Stable ascending order by send time. Wire snapshots carry no order
/// guarantee, so every message collection passes through here before
/// it is handed to a consumer.
pub fn sort_by_timestamp(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_timestamp_is_stable() {
        let mut a = Message::group("t1".into(), "u1".into(), "first".into());
        a.timestamp = 10;
        let mut b = Message::group("t1".into(), "u2".into(), "second".into());
        b.timestamp = 10;
        let mut c = Message::group("t1".into(), "u3".into(), "earlier".into());
        c.timestamp = 5;

        let mut messages = vec![a.clone(), b.clone(), c.clone()];
        sort_by_timestamp(&mut messages);
        assert_eq!(messages, vec![c, a, b]);
    }
}
