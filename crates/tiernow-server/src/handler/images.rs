//! Image retrieval handlers.
//!
//! Serves image blobs by key straight from the object store. The store is
//! the source of truth for both the bytes and the content type; metadata
//! rows are never consulted here.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tiernow_opendal::StorageBackend;

use crate::extract::Path;
use crate::handler::{ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for image retrieval operations.
const TRACING_TARGET: &str = "tiernow_server::handler::images";

/// Prefix under which all image blobs are stored.
pub(crate) const IMAGES_PREFIX: &str = "images/";

/// Content type served when the store did not record one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// `Path` param for `{key}` handlers.
#[must_use]
#[derive(Debug, Deserialize)]
pub struct ImagePathParams {
    /// Blob key of the image, as returned by the upload endpoint.
    pub key: String,
}

/// Serves an image blob with its stored content type.
///
/// The content-type lookup runs before the blob is opened, so no blob
/// handle is held during the metadata call; once opened, the streaming
/// reader is released by drop on every exit path. Either lookup failing
/// surfaces the same not-found error.
async fn serve_image(
    State(storage): State<StorageBackend>,
    Path(path_params): Path<ImagePathParams>,
) -> Result<Response> {
    let path = format!("{}{}", IMAGES_PREFIX, path_params.key);

    let metadata = storage.stat(&path).await.map_err(|err| {
        tracing::warn!(
            target: TRACING_TARGET,
            key = %path,
            error = %err,
            "failed to retrieve image metadata"
        );
        ErrorKind::NotFound
            .with_message("Couldn't find image")
            .with_resource("image")
            .into_static()
    })?;

    let stream = storage.stream(&path).await.map_err(|err| {
        tracing::warn!(
            target: TRACING_TARGET,
            key = %path,
            error = %err,
            "failed to open image blob"
        );
        ErrorKind::NotFound
            .with_message("Couldn't find image")
            .with_resource("image")
            .into_static()
    })?;

    let content_type = metadata
        .content_type
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    tracing::debug!(
        target: TRACING_TARGET,
        key = %path,
        content_type = %content_type,
        size = metadata.size,
        "serving image"
    );

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_LENGTH, metadata.size.to_string()),
    ];

    Ok((headers, Body::from_stream(stream)).into_response())
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/images/{key}", get(serve_image))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use bytes::Bytes;

    use crate::handler::test::test_state;

    use super::*;

    #[tokio::test]
    async fn serves_uploaded_bytes_with_fallback_content_type() -> anyhow::Result<()> {
        let state = test_state();
        let data = Bytes::from_static(b"\x89PNG\r\n\x1a\n pixels");
        state
            .storage()
            .put("images/abc.png", data.clone(), "image/png")
            .await?;

        let server = TestServer::new(routes().with_state(state))?;
        let response = server.get("/images/abc.png").await;

        response.assert_status_ok();
        assert_eq!(response.as_bytes(), &data);
        // The in-memory backend does not persist content types; the
        // handler falls back to a generic one.
        assert_eq!(
            response.header(header::CONTENT_TYPE),
            FALLBACK_CONTENT_TYPE
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() -> anyhow::Result<()> {
        let server = TestServer::new(routes().with_state(test_state()))?;

        let response = server.get("/images/nope.png").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
