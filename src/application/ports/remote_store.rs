use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::shared::error::AppError;

/// Slash-separated collection address. A `*` segment is a wildcard that
/// matches any single segment, which turns the path into a collection group
/// (`trips/*/messages` covers every trip's message collection).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

impl CollectionPath {
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn users() -> Self {
        Self::new("users")
    }

    pub fn trips() -> Self {
        Self::new("trips")
    }

    pub fn activities() -> Self {
        Self::new("activities")
    }

    pub fn budget_items() -> Self {
        Self::new("budgetItems")
    }

    pub fn notifications(user_id: &str) -> Self {
        Self::new(&format!("notifications/{user_id}"))
    }

    pub fn trip_messages(trip_id: &str) -> Self {
        Self::new(&format!("trips/{trip_id}/messages"))
    }

    /// The collection group covering every trip's message collection.
    pub fn all_trip_messages() -> Self {
        Self::new("trips/*/messages")
    }

    pub fn is_group(&self) -> bool {
        self.segments.iter().any(|s| s == "*")
    }

    /// Segment-wise match, `*` on either side matching any one segment.
    pub fn matches(&self, other: &CollectionPath) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a == "*" || b == "*" || a == b)
    }

    pub fn doc(&self, key: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            key: key.to_string(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: CollectionPath,
    pub key: String,
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// Equality filter on one top-level wire field.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFilter {
    pub field: String,
    pub value: Value,
}

impl RemoteFilter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Value) -> bool {
        document.get(&self.field) == Some(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub key: String,
    pub value: Value,
}

pub type RemoteSnapshot = Vec<RemoteDocument>;

/// Whole-snapshot push: every emission is the full matching set, first the
/// current one, then again after each mutation to any member. An error is the
/// final item before the stream closes.
pub type SnapshotStream = BoxStream<'static, Result<RemoteSnapshot, AppError>>;

pub type DocumentStream = BoxStream<'static, Result<Option<Value>, AppError>>;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Dropping the returned stream deregisters the listener.
    fn subscribe(&self, path: &CollectionPath, filter: Option<RemoteFilter>) -> SnapshotStream;

    /// Current value immediately, then on change; consecutive duplicates are
    /// suppressed.
    fn subscribe_document(&self, path: &DocumentPath) -> DocumentStream;

    async fn get(
        &self,
        path: &CollectionPath,
        filter: Option<RemoteFilter>,
    ) -> Result<RemoteSnapshot, AppError>;

    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Value>, AppError>;

    async fn set(&self, path: &DocumentPath, value: Value) -> Result<(), AppError>;

    async fn remove(&self, path: &DocumentPath) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_path_matches_concrete_collections() {
        let group = CollectionPath::all_trip_messages();
        assert!(group.is_group());
        assert!(group.matches(&CollectionPath::trip_messages("trip-1")));
        assert!(group.matches(&CollectionPath::trip_messages("trip-2")));
        assert!(!group.matches(&CollectionPath::trips()));
        assert!(!group.matches(&CollectionPath::notifications("u1")));
    }

    #[test]
    fn concrete_paths_match_only_themselves() {
        let a = CollectionPath::trip_messages("trip-1");
        assert!(a.matches(&CollectionPath::trip_messages("trip-1")));
        assert!(!a.matches(&CollectionPath::trip_messages("trip-2")));
    }

    #[test]
    fn document_path_renders_full_address() {
        let path = CollectionPath::notifications("u1").doc("n1");
        assert_eq!(path.to_string(), "notifications/u1/n1");
    }

    #[test]
    fn filter_compares_one_top_level_field() {
        let filter = RemoteFilter::field_equals("organiserId", "u1");
        assert!(filter.matches(&serde_json::json!({"organiserId": "u1"})));
        assert!(!filter.matches(&serde_json::json!({"organiserId": "u2"})));
        assert!(!filter.matches(&serde_json::json!({})));
    }
}
