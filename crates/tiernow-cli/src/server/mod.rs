//! HTTP server lifecycle.

mod error;
mod http_server;
mod shutdown;

pub use error::{Result, ServerError};
pub use http_server::serve_http;
pub use shutdown::shutdown_signal;

/// Tracing target for server startup.
pub(crate) const TRACING_TARGET_STARTUP: &str = "tiernow_cli::server::startup";

/// Tracing target for server shutdown.
pub(crate) const TRACING_TARGET_SHUTDOWN: &str = "tiernow_cli::server::shutdown";
