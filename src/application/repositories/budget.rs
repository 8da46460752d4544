use std::sync::Arc;

use futures::StreamExt;

use super::routing::{self, SourceSelection};
use crate::application::ports::local_store::{BudgetItemStore, LiveStream};
use crate::application::ports::remote_store::{CollectionPath, RemoteFilter, RemoteStore};
use crate::domain::entities::BudgetItem;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct BudgetRepository {
    local: Arc<dyn BudgetItemStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

impl BudgetRepository {
    pub fn new(
        local: Arc<dyn BudgetItemStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
        }
    }

    pub fn watch_for_trip(&self, trip_id: &str) -> LiveStream<Vec<BudgetItem>> {
        match routing::select_source(&self.connectivity, "budget") {
            SourceSelection::Remote => {
                let filter = RemoteFilter::field_equals("tripId", trip_id);
                self.remote
                    .subscribe(&CollectionPath::budget_items(), Some(filter))
                    .map(|item| item.map(|snapshot| wire::decode_snapshot(&snapshot)))
                    .boxed()
            }
            SourceSelection::Local => self.local.watch_budget_for_trip(trip_id),
        }
    }

    pub async fn save_budget_item(&self, item: &BudgetItem) -> Result<(), AppError> {
        self.local.upsert_budget_item(item).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        let path = CollectionPath::budget_items().doc(&item.id);
        match wire::encode(item) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(item_id = %item.id, error = %err, "remote budget mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(item_id = %item.id, error = %err, "could not encode budget item for remote");
            }
        }
        Ok(())
    }

    pub async fn delete_budget_item(&self, id: &str) -> Result<(), AppError> {
        self.local.delete_budget_item(id).await?;
        if self.connectivity.is_available() {
            let path = CollectionPath::budget_items().doc(id);
            if let Err(err) = self.remote.remove(&path).await {
                tracing::warn!(item_id = id, error = %err, "remote budget delete failed; local copy removed");
            }
        }
        Ok(())
    }
}
