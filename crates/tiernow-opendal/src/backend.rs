//! Storage backend implementation.

use bytes::Bytes;
use opendal::{FuturesBytesStream, Operator, services};

use crate::TRACING_TARGET;
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Byte stream handle for a blob being read.
///
/// Dropping the stream releases the underlying reader, including when the
/// response body copy is abandoned partway through.
pub type BlobStream = FuturesBytesStream;

/// Blob metadata as recorded by the object store at upload time.
#[derive(Debug, Clone)]
pub struct BlobMetadata {
    /// Blob size in bytes.
    pub size: u64,
    /// Content type captured when the blob was written.
    pub content_type: Option<String>,
}

/// Unified storage backend that wraps OpenDAL operators.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            "storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Writes a blob under the given path, recording its content type.
    ///
    /// The content type is only attached when the underlying service is able
    /// to persist it (the in-memory backend is not); callers fall back to a
    /// generic content type on retrieval when it is absent.
    pub async fn put(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            content_type = %content_type,
            "writing blob"
        );

        let mut write = self.operator.write_with(path, data);
        if self.operator.info().full_capability().write_with_content_type {
            write = write.content_type(content_type);
        }
        write.await?;

        tracing::debug!(target: TRACING_TARGET, path = %path, "blob write complete");
        Ok(())
    }

    /// Reads an entire blob into memory.
    pub async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let data = self.operator.read(path).await?.to_vec();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "blob read complete"
        );

        Ok(data)
    }

    /// Opens a blob as a byte stream.
    pub async fn stream(&self, path: &str) -> StorageResult<BlobStream> {
        let reader = self.operator.reader(path).await?;
        let stream = reader.into_bytes_stream(..).await?;

        tracing::debug!(target: TRACING_TARGET, path = %path, "blob stream opened");
        Ok(stream)
    }

    /// Gets metadata for a blob.
    pub async fn stat(&self, path: &str) -> StorageResult<BlobMetadata> {
        let meta = self.operator.stat(path).await?;

        Ok(BlobMetadata {
            size: meta.content_length(),
            content_type: meta.content_type().map(|s| s.to_string()),
        })
    }

    /// Checks whether a blob exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Lists blob paths under the given prefix.
    pub async fn list(&self, path: &str) -> StorageResult<Vec<String>> {
        let entries = self.operator.list(path).await?;
        Ok(entries.into_iter().map(|e| e.path().to_string()).collect())
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config {
            #[cfg(feature = "s3")]
            StorageConfig::S3(s3) => {
                let mut builder = services::S3::default().bucket(&s3.bucket);

                if let Some(ref region) = s3.region {
                    builder = builder.region(region);
                }

                if let Some(ref endpoint) = s3.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = s3.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = s3.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "memory")]
            StorageConfig::Memory(memory) => {
                let mut builder = services::Memory::default();

                if let Some(ref root) = memory.root {
                    builder = builder.root(root);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            // This should never be reached if the config was created with the
            // same features enabled
            #[allow(unreachable_patterns)]
            _ => Err(StorageError::init(format!(
                "backend {:?} is not supported with current features",
                config.backend_name()
            ))),
        }
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend", &self.config.backend_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    fn memory_backend() -> StorageBackend {
        StorageBackend::new(StorageConfig::memory()).expect("memory backend")
    }

    #[tokio::test]
    async fn put_then_read_returns_same_bytes() {
        let backend = memory_backend();
        let data = Bytes::from_static(b"\x89PNG\r\n\x1a\n fake image bytes");

        backend
            .put("images/test.png", data.clone(), "image/png")
            .await
            .unwrap();

        let read = backend.read("images/test.png").await.unwrap();
        assert_eq!(read, data.to_vec());
    }

    #[tokio::test]
    async fn put_then_stream_returns_same_bytes() {
        let backend = memory_backend();
        let data = Bytes::from_static(b"streamed image contents");

        backend
            .put("images/stream.jpg", data.clone(), "image/jpeg")
            .await
            .unwrap();

        let mut stream = backend.stream("images/stream.jpg").await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(collected, data.to_vec());
    }

    #[tokio::test]
    async fn stat_reports_size() {
        let backend = memory_backend();
        let data = Bytes::from_static(b"12345");

        backend
            .put("images/sized.gif", data, "image/gif")
            .await
            .unwrap();

        let meta = backend.stat("images/sized.gif").await.unwrap();
        assert_eq!(meta.size, 5);
    }

    #[tokio::test]
    async fn read_missing_blob_is_not_found() {
        let backend = memory_backend();

        let err = backend.read("images/absent.png").await.unwrap_err();
        assert!(err.is_not_found());

        let err = backend.stat("images/absent.png").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn exists_reflects_writes() {
        let backend = memory_backend();

        assert!(!backend.exists("images/a.png").await.unwrap());
        backend
            .put("images/a.png", Bytes::from_static(b"a"), "image/png")
            .await
            .unwrap();
        assert!(backend.exists("images/a.png").await.unwrap());
    }
}
