//! Service layer error types.

use thiserror::Error;

/// Result type for service operations.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service layer error types.
///
/// These represent failures while wiring the service together:
/// configuration problems and connectivity to the two external stores.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration error (invalid config values, missing settings).
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Metadata store connection or migration error.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Object store initialization error.
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ServiceError {
    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        let boxed: BoxError = Box::new(cause);
        match &mut self {
            Self::Config { source, .. }
            | Self::Database { source, .. }
            | Self::Storage { source, .. } => *source = Some(boxed),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_attached() {
        let io_err = std::io::Error::other("underlying");
        let err = ServiceError::database("failed to connect").with_source(io_err);

        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("failed to connect"));
    }
}
