//! Router middleware for observability and error recovery.

use std::any::Any;
use std::time::Duration;

use axum::Router;
use axum::http::header;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handler::ErrorKind;

/// Tracing target for panic recovery.
const TRACING_TARGET_PANIC: &str = "tiernow_server::recovery::panic";

/// Configuration for recovery middleware behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Maximum duration in seconds to wait for a request to complete
    /// before timing out.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value = "30")
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
        }
    }
}

impl RecoveryConfig {
    /// Returns the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt {
    /// Layers observability middleware for request tracing and logging.
    ///
    /// Generates unique request IDs, adds tracing spans for each request,
    /// propagates request IDs to responses, and marks sensitive headers
    /// for redaction in logs.
    fn with_observability(self) -> Self;
}

impl<S> RouterObservabilityExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(header::HeaderName::from_static(
            "x-request-id",
        )))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static("x-request-id"),
            MakeRequestUuid,
        ))
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt {
    /// Layers recovery middleware with the provided configuration.
    ///
    /// Catches panics in handlers and enforces a per-request timeout at
    /// the transport layer. Timeouts do not cancel in-flight store calls.
    fn with_recovery(self, config: RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: RecoveryConfig) -> Self {
        self.layer(CatchPanicLayer::custom(handle_panic))
            .layer(TimeoutLayer::new(config.request_timeout()))
    }
}

/// Extension trait for `axum::`[`Router`] to apply CORS middleware.
pub trait RouterCorsExt {
    /// Layers a permissive CORS policy; the API carries no credentials.
    fn with_cors(self) -> Self;
}

impl<S> RouterCorsExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_cors(self) -> Self {
        self.layer(CorsLayer::permissive())
    }
}

/// Converts a handler panic into a structured 500 response.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(
        target: TRACING_TARGET_PANIC,
        panic = %detail,
        "handler panicked"
    );

    ErrorKind::InternalServerError.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recovery_timeout() {
        let config = RecoveryConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn panic_payloads_produce_internal_server_error() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), 500);

        let response = handle_panic(Box::new(String::from("boom")));
        assert_eq!(response.status(), 500);

        let response = handle_panic(Box::new(42_u8));
        assert_eq!(response.status(), 500);
    }
}
