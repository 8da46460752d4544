use std::sync::Arc;

use crate::application::ports::local_store::UserStore;
use crate::application::ports::remote_store::{CollectionPath, RemoteDocument, RemoteStore};
use crate::domain::entities::User;
use crate::infrastructure::connectivity::ConnectivityMonitor;
use crate::infrastructure::remote::wire;
use crate::shared::error::AppError;

#[derive(Clone)]
pub struct UserRepository {
    local: Arc<dyn UserStore>,
    remote: Arc<dyn RemoteStore>,
    connectivity: ConnectivityMonitor,
}

impl UserRepository {
    pub fn new(
        local: Arc<dyn UserStore>,
        remote: Arc<dyn RemoteStore>,
        connectivity: ConnectivityMonitor,
    ) -> Self {
        Self {
            local,
            remote,
            connectivity,
        }
    }

    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        self.local.upsert_user(user).await?;
        if !self.connectivity.is_available() {
            return Ok(());
        }
        let path = CollectionPath::users().doc(&user.id);
        match wire::encode(user) {
            Ok(value) => {
                if let Err(err) = self.remote.set(&path, value).await {
                    tracing::warn!(user_id = %user.id, error = %err, "remote user mirror failed; keeping local copy");
                }
            }
            Err(err) => {
                tracing::warn!(user_id = %user.id, error = %err, "could not encode user for remote");
            }
        }
        Ok(())
    }

    /// Prefers a remote fetch when available. A remote hit is also written
    /// into the local table so offline fan-out has users to enumerate.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        if self.connectivity.is_available() {
            match self.remote.get_document(&CollectionPath::users().doc(id)).await {
                Ok(Some(value)) => {
                    let document = RemoteDocument {
                        key: id.to_string(),
                        value,
                    };
                    if let Some(user) = wire::decode_document::<User>(&document) {
                        if let Err(err) = self.local.upsert_user(&user).await {
                            tracing::warn!(user_id = id, error = %err, "could not warm local user cache");
                        }
                        return Ok(Some(user));
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(user_id = id, error = %err, "remote user fetch failed; falling back to local");
                }
            }
        }
        self.local.get_user(id).await
    }
}
