use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::trip::ItineraryEntry;

pub fn string_set<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_string_set(&value))
}

/// Membership fields arrive either as an array of ids or as an object whose
/// keys are the ids. Both collapse to an ordered, first-occurrence
/// deduplicated list; any other shape decodes as empty.
pub fn normalize_string_set(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => dedup(items.iter().filter_map(|v| v.as_str().map(str::to_string))),
        Value::Object(map) => dedup(map.keys().cloned()),
        _ => Vec::new(),
    }
}

fn dedup(values: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

pub fn itinerary<'de, D>(deserializer: D) -> Result<Vec<ItineraryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_itinerary(&value))
}

/// The itinerary arrives as an array of entry objects or as an object keyed
/// by entry id. Entries that fail to decode are dropped; an entry without an
/// id inherits its key, or its index in the array shape.
pub fn normalize_itinerary(value: &Value) -> Vec<ItineraryEntry> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| decode_entry(item, &index.to_string()))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, item)| decode_entry(item, key))
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_entry(value: &Value, fallback_id: &str) -> Option<ItineraryEntry> {
    let mut entry: ItineraryEntry = serde_json::from_value(value.clone()).ok()?;
    if entry.id.is_empty() {
        entry.id = fallback_id.to_string();
    }
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_set_from_array_dedups_in_order() {
        let value = json!(["a", "b", "a", "c", "b"]);
        assert_eq!(normalize_string_set(&value), vec!["a", "b", "c"]);
    }

    #[test]
    fn string_set_from_object_takes_keys() {
        let value = json!({"u1": true, "u2": {"joined": 1}});
        let mut set = normalize_string_set(&value);
        set.sort();
        assert_eq!(set, vec!["u1", "u2"]);
    }

    #[test]
    fn string_set_decodes_equal_from_array_and_object() {
        let from_array = normalize_string_set(&json!(["ana", "bruno", "carla"]));
        let from_object =
            normalize_string_set(&json!({"ana": true, "bruno": 1, "carla": {"joined": true}}));
        assert_eq!(from_array, from_object);
        assert_eq!(from_array, vec!["ana", "bruno", "carla"]);
    }

    #[test]
    fn string_set_skips_non_string_items() {
        let value = json!(["a", 42, null, "b"]);
        assert_eq!(normalize_string_set(&value), vec!["a", "b"]);
    }

    #[test]
    fn string_set_from_scalar_is_empty() {
        assert!(normalize_string_set(&json!("oops")).is_empty());
        assert!(normalize_string_set(&json!(7)).is_empty());
    }

    #[test]
    fn itinerary_from_array_fills_index_ids_and_drops_bad_entries() {
        let value = json!([
            {"date": "2026-07-01", "title": "Arrive"},
            {"title": "No date, dropped"},
            {"id": "day-3", "date": "2026-07-03"}
        ]);
        let entries = normalize_itinerary(&value);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "0");
        assert_eq!(entries[0].title.as_deref(), Some("Arrive"));
        assert_eq!(entries[1].id, "day-3");
    }

    #[test]
    fn itinerary_from_object_inherits_keys() {
        let value = json!({
            "stop-1": {"date": "2026-07-01", "location": "Alfama"},
            "stop-2": {"id": "explicit", "date": "2026-07-02"}
        });
        let mut entries = normalize_itinerary(&value);
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        assert_eq!(entries[0].id, "stop-1");
        assert_eq!(entries[1].id, "explicit");
    }
}
