use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::application::ports::remote_store::{RemoteDocument, RemoteSnapshot};
use crate::domain::entities::Entity;
use crate::shared::error::AppError;

/// Decodes one wire document. A payload that does not decode is dropped, not
/// an error; a payload without an id takes its storage key.
pub fn decode_document<T>(document: &RemoteDocument) -> Option<T>
where
    T: Entity + DeserializeOwned,
{
    match serde_json::from_value::<T>(document.value.clone()) {
        Ok(mut entity) => {
            if entity.id().is_empty() {
                entity.set_id(document.key.clone());
            }
            Some(entity)
        }
        Err(err) => {
            tracing::debug!(key = %document.key, error = %err, "dropping undecodable document");
            None
        }
    }
}

/// Decodes a whole snapshot, keeping every record that survives
/// `decode_document`.
pub fn decode_snapshot<T>(snapshot: &RemoteSnapshot) -> Vec<T>
where
    T: Entity + DeserializeOwned,
{
    snapshot.iter().filter_map(decode_document).collect()
}

pub fn encode<T: Serialize>(entity: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(entity)?)
}
