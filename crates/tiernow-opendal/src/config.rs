//! Storage configuration types.

use serde::{Deserialize, Serialize};

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StorageConfig {
    /// Amazon S3 compatible storage (AWS S3, MinIO, Garage).
    S3(S3Config),
    /// In-memory storage, for tests and local development.
    Memory(MemoryConfig),
}

impl StorageConfig {
    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::Memory(_) => "memory",
        }
    }

    /// Creates an in-memory storage configuration.
    pub fn memory() -> Self {
        Self::Memory(MemoryConfig::default())
    }
}

/// Configuration for S3-compatible storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket name.
    pub bucket: String,
    /// Region, if the endpoint requires one.
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible services (MinIO, Garage).
    pub endpoint: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Creates a new S3 configuration for the given bucket.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Sets the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sets a custom endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets static credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

/// Configuration for the in-memory storage backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Root path within the in-memory store.
    pub root: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!(StorageConfig::memory().backend_name(), "memory");
        assert_eq!(
            StorageConfig::S3(S3Config::new("tiernow")).backend_name(),
            "s3"
        );
    }

    #[test]
    fn s3_config_builders() {
        let config = S3Config::new("tiernow")
            .with_region("garage")
            .with_endpoint("http://localhost:3900")
            .with_credentials("key", "secret");

        assert_eq!(config.bucket, "tiernow");
        assert_eq!(config.region.as_deref(), Some("garage"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:3900"));
        assert_eq!(config.access_key_id.as_deref(), Some("key"));
        assert_eq!(config.secret_access_key.as_deref(), Some("secret"));
    }

    #[test]
    fn serde_tagged_representation() {
        let config = StorageConfig::memory();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"memory\""));
    }
}
