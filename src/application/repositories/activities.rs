use std::sync::Arc;

use futures::StreamExt;

use super::routing::{self, SourceSelection};
use crate::application::ports::local_store::{ActivityStore, LiveStream};
use crate::application::ports::remote_store::{CollectionPath, RemoteFilter, RemoteStore};
use crate::domain::entities::Activity;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct ActivityRepository {
    local: Arc<dyn ActivityStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

impl ActivityRepository {
    pub fn new(
        local: Arc<dyn ActivityStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
        }
    }

    pub fn watch_for_trip(&self, trip_id: &str) -> LiveStream<Vec<Activity>> {
        match routing::select_source(&self.connectivity, "activities") {
            SourceSelection::Remote => {
                let filter = RemoteFilter::field_equals("tripId", trip_id);
                self.remote
                    .subscribe(&CollectionPath::activities(), Some(filter))
                    .map(|item| item.map(|snapshot| wire::decode_snapshot(&snapshot)))
                    .boxed()
            }
            SourceSelection::Local => self.local.watch_activities_for_trip(trip_id),
        }
    }

    pub async fn save_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.local.upsert_activity(activity).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        let path = CollectionPath::activities().doc(&activity.id);
        match wire::encode(activity) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(activity_id = %activity.id, error = %err, "remote activity mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(activity_id = %activity.id, error = %err, "could not encode activity for remote");
            }
        }
        Ok(())
    }

    pub async fn delete_activity(&self, id: &str) -> Result<(), AppError> {
        self.local.delete_activity(id).await?;
        if self.connectivity.is_available() {
            let path = CollectionPath::activities().doc(id);
            if let Err(err) = self.remote.remove(&path).await {
                tracing::warn!(activity_id = id, error = %err, "remote activity delete failed; local copy removed");
            }
        }
        Ok(())
    }
}
