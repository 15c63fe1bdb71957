//! Server lifecycle error types.

use std::io;

use thiserror::Error;

/// Result type for server lifecycle operations.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;

/// Errors that can occur while starting or running the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The server configuration failed validation.
    #[error("invalid server configuration: {0}")]
    InvalidConfig(String),

    /// The listener could not bind to the configured address.
    #[error("failed to bind to {address}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The server terminated with a runtime error.
    #[error("server runtime error")]
    Runtime(#[source] io::Error),
}
