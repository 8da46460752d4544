use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{decode, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityCategory {
    Sightseeing,
    Food,
    Transport,
    Accommodation,
    Entertainment,
    #[default]
    Other,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Sightseeing => "sightseeing",
            ActivityCategory::Food => "food",
            ActivityCategory::Transport => "transport",
            ActivityCategory::Accommodation => "accommodation",
            ActivityCategory::Entertainment => "entertainment",
            ActivityCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "sightseeing" => ActivityCategory::Sightseeing,
            "food" => ActivityCategory::Food,
            "transport" => ActivityCategory::Transport,
            "accommodation" => ActivityCategory::Accommodation,
            "entertainment" => ActivityCategory::Entertainment,
            _ => ActivityCategory::Other,
        }
    }
}

impl Serialize for ActivityCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ActivityCategory::parse(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "decode::string_set")]
    pub assigned_to: Vec<String>,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub category: ActivityCategory,
    #[serde(default)]
    pub created_at: i64,
}

impl Activity {
    pub fn new(trip_id: String, title: String, date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id,
            title,
            date,
            time: None,
            location: None,
            description: None,
            assigned_to: Vec::new(),
            cost: 0.0,
            category: ActivityCategory::Other,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_category(mut self, category: ActivityCategory) -> Self {
        self.category = category;
        self
    }
}

impl Entity for Activity {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
