use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{decode, Entity};

/// One stop on a trip's day-by-day plan. Lives inside the trip document,
/// never addressed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEntry {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    pub title: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub destination: String,
    /// Millisecond timestamps, as stored on the wire.
    pub start_date: i64,
    pub end_date: i64,
    pub organiser_id: String,
    #[serde(default, deserialize_with = "decode::string_set")]
    pub participant_ids: Vec<String>,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub spent_amount: f64,
    #[serde(default, deserialize_with = "decode::itinerary")]
    pub itinerary: Vec<ItineraryEntry>,
}

impl Trip {
    pub fn new(
        title: String,
        destination: String,
        start_date: i64,
        end_date: i64,
        organiser_id: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            destination,
            start_date,
            end_date,
            organiser_id,
            participant_ids: Vec::new(),
            budget: 0.0,
            spent_amount: 0.0,
            itinerary: Vec::new(),
        }
    }

    /// Adds a participant unless already present. Returns whether the set changed.
    pub fn add_participant(&mut self, user_id: &str) -> bool {
        if self.participant_ids.iter().any(|p| p == user_id) {
            return false;
        }
        self.participant_ids.push(user_id.to_string());
        true
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.participant_ids.iter().any(|p| p == user_id)
    }
}

impl Entity for Trip {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
