//! CLI argument and environment configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Args, Parser};
use tiernow_opendal::{S3Config, StorageConfig};
use tiernow_postgres::PgConfig;
use tiernow_server::middleware::RecoveryConfig;
use tiernow_server::service::{ServiceConfig, ServiceError};

use crate::TRACING_TARGET_CONFIG;

/// Tierlist catalog service.
#[derive(Debug, Parser)]
#[command(name = "tiernow", version, about)]
pub struct Cli {
    /// HTTP server settings.
    #[command(flatten)]
    pub server: ServerConfig,

    /// Metadata store settings.
    #[command(flatten)]
    pub postgres: PgConfig,

    /// Object store settings.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Recovery middleware settings.
    #[command(flatten)]
    pub recovery: RecoveryConfig,
}

impl Cli {
    /// Builds the service configuration from the parsed arguments.
    pub fn service_config(&self) -> Result<ServiceConfig, ServiceError> {
        ServiceConfig::builder()
            .with_postgres(self.postgres.clone())
            .with_storage(self.storage.to_config())
            .build()
            .map_err(|e| ServiceError::config(e.to_string()))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Args)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[arg(long, env = "SERVER_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port the server listens on.
    #[arg(long, env = "SERVER_PORT", default_value = "5452")]
    pub port: u16,

    /// Maximum duration in seconds to wait for cleanup on shutdown.
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value = "30")]
    pub shutdown_timeout: u64,
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns whether the server binds to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    /// Returns the shutdown timeout as a Duration.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("server port must not be 0".to_string());
        }

        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5452,
            shutdown_timeout: 30,
        }
    }
}

/// Object store settings.
///
/// An S3-compatible backend is used whenever a bucket is configured; the
/// in-memory backend is the fallback for local development.
#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// S3 bucket holding image blobs.
    #[arg(long = "s3-bucket", env = "S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// S3 region.
    #[arg(long = "s3-region", env = "S3_REGION")]
    pub s3_region: Option<String>,

    /// Custom S3 endpoint (MinIO, Garage).
    #[arg(long = "s3-endpoint", env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// S3 access key id.
    #[arg(long = "s3-access-key-id", env = "S3_ACCESS_KEY_ID")]
    pub s3_access_key_id: Option<String>,

    /// S3 secret access key.
    #[arg(
        long = "s3-secret-access-key",
        env = "S3_SECRET_ACCESS_KEY",
        hide_env_values = true
    )]
    pub s3_secret_access_key: Option<String>,
}

impl StorageArgs {
    /// Converts the arguments into a storage configuration.
    pub fn to_config(&self) -> StorageConfig {
        let Some(bucket) = &self.s3_bucket else {
            tracing::warn!(
                target: TRACING_TARGET_CONFIG,
                "no S3 bucket configured, falling back to in-memory storage; \
                 uploaded blobs will not survive a restart"
            );
            return StorageConfig::memory();
        };

        let mut config = S3Config::new(bucket);

        if let Some(region) = &self.s3_region {
            config = config.with_region(region);
        }

        if let Some(endpoint) = &self.s3_endpoint {
            config = config.with_endpoint(endpoint);
        }

        if let (Some(key_id), Some(secret)) = (&self.s3_access_key_id, &self.s3_secret_access_key) {
            config = config.with_credentials(key_id, secret);
        }

        StorageConfig::S3(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.binds_to_all_interfaces());
        assert_eq!(config.server_addr().port(), 5452);
    }

    #[test]
    fn rejects_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unspecified_host_binds_to_all_interfaces() {
        let config = ServerConfig {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            ..ServerConfig::default()
        };
        assert!(config.binds_to_all_interfaces());
    }

    #[test]
    fn storage_args_without_bucket_fall_back_to_memory() {
        let args = StorageArgs {
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
        };
        assert_eq!(args.to_config(), StorageConfig::memory());
    }

    #[test]
    fn storage_args_with_bucket_select_s3() {
        let args = StorageArgs {
            s3_bucket: Some("tiernow".into()),
            s3_region: Some("garage".into()),
            s3_endpoint: Some("http://localhost:3900".into()),
            s3_access_key_id: Some("key".into()),
            s3_secret_access_key: Some("secret".into()),
        };

        let StorageConfig::S3(config) = args.to_config() else {
            panic!("expected the S3 backend");
        };
        assert_eq!(config.bucket, "tiernow");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:3900"));
    }

    #[test]
    fn cli_arguments_parse() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
