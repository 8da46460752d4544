use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{decode, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetCategory {
    Transport,
    Accommodation,
    Food,
    Activities,
    Shopping,
    #[default]
    Other,
}

impl BudgetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetCategory::Transport => "transport",
            BudgetCategory::Accommodation => "accommodation",
            BudgetCategory::Food => "food",
            BudgetCategory::Activities => "activities",
            BudgetCategory::Shopping => "shopping",
            BudgetCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "transport" => BudgetCategory::Transport,
            "accommodation" => BudgetCategory::Accommodation,
            "food" => BudgetCategory::Food,
            "activities" => BudgetCategory::Activities,
            "shopping" => BudgetCategory::Shopping,
            _ => BudgetCategory::Other,
        }
    }
}

impl Serialize for BudgetCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BudgetCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(BudgetCategory::parse(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    #[serde(default)]
    pub id: String,
    pub trip_id: String,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub category: BudgetCategory,
    pub paid_by: String,
    #[serde(default, deserialize_with = "decode::string_set")]
    pub shared_with: Vec<String>,
    pub date: NaiveDate,
    pub description: Option<String>,
}

impl BudgetItem {
    pub fn new(trip_id: String, title: String, amount: f64, paid_by: String, date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            trip_id,
            title,
            amount,
            category: BudgetCategory::Other,
            paid_by,
            shared_with: Vec::new(),
            date,
            description: None,
        }
    }

    pub fn with_category(mut self, category: BudgetCategory) -> Self {
        self.category = category;
        self
    }

    /// Equal split across the sharing set. An empty set means the payer
    /// carries the whole amount.
    pub fn share_per_person(&self) -> f64 {
        let heads = self.shared_with.len().max(1);
        self.amount / heads as f64
    }
}

impl Entity for BudgetItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
