//! Application state and dependency injection.

use tiernow_opendal::StorageBackend;
use tiernow_postgres::PgClient;

use crate::service::{Result, ServiceConfig};

/// Application state.
///
/// One explicit capability struct holding the handles to both external
/// stores, constructed once at startup and passed into every handler via
/// [`State`] extraction (dependency injection). No ambient globals.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pg_client: PgClient,
    storage: StorageBackend,
}

impl ServiceState {
    /// Creates application state from already-connected store handles.
    pub fn new(pg_client: PgClient, storage: StorageBackend) -> Self {
        Self { pg_client, storage }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to the metadata store (running pending migrations) and
    /// initializes the object store backend.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let service_state = Self {
            pg_client: config.connect_postgres().await?,
            storage: config.connect_storage()?,
        };

        Ok(service_state)
    }

    /// Returns the object store handle.
    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }

    /// Returns the metadata store client.
    pub fn pg_client(&self) -> &PgClient {
        &self.pg_client
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(pg_client: PgClient);
impl_di!(storage: StorageBackend);
