//! System health monitoring handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use tiernow_postgres::PgClient;

use crate::extract::Json;
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "tiernow_server::handler::monitors";

/// Connection pool statistics for the metadata store.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStatusResponse {
    /// Maximum number of connections in the pool
    pub max_size: usize,
    /// Current number of connections in the pool
    pub size: usize,
    /// Number of available connections
    pub available: usize,
    /// Number of requests waiting for a connection
    pub waiting: usize,
}

/// Health status response.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status
    pub status: String,
    /// Metadata store connection pool statistics
    pub database_pool: PoolStatusResponse,
}

/// Reports service liveness with metadata store pool statistics.
async fn health_status(State(pg_client): State<PgClient>) -> Result<Json<HealthResponse>> {
    let pool_status = pg_client.pool_status();

    tracing::debug!(
        target: TRACING_TARGET,
        pool_size = pool_status.size,
        pool_available = pool_status.available,
        "health status requested"
    );

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database_pool: PoolStatusResponse {
            max_size: pool_status.max_size,
            size: pool_status.size,
            available: pool_status.available,
            waiting: pool_status.waiting,
        },
    }))
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;

    use crate::handler::test::test_state;

    use super::*;

    #[tokio::test]
    async fn health_reports_pool_statistics() -> anyhow::Result<()> {
        let server = TestServer::new(routes().with_state(test_state()))?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "ok");
        assert!(body["databasePool"]["maxSize"].as_u64().unwrap() > 0);
        Ok(())
    }
}
