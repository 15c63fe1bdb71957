//! Tierlist handlers: creation, assembly, image upload, and entry
//! reassignment.
//!
//! Upload is the one place where both stores are written. The ordering is
//! fixed: validate the request, write the blob, then insert the metadata
//! row. A metadata failure after a successful blob write leaves an orphan
//! blob behind; that window is logged and accepted, not compensated. The
//! catalog tolerates unreferenced blobs, never dangling metadata.

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::routing::{get, post};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tiernow_opendal::StorageBackend;
use tiernow_postgres::model::{DEFAULT_TIER_NAMES, Entry, NewEntry, NewTier, NewTierlist, Tier};
use tiernow_postgres::query::{EntryRepository, TierlistRepository};
use tiernow_postgres::scoped_futures::ScopedFutureExt;
use tiernow_postgres::PgClient;
use uuid::Uuid;
use validator::Validate;

use crate::extract::{Json, Path, ValidateJson};
use crate::handler::images::IMAGES_PREFIX;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ServiceState, generate_blob_key};

/// Tracing target for tierlist operations.
const TRACING_TARGET: &str = "tiernow_server::handler::tierlists";

/// Maximum upload size: 10 MiB, rejected before any store write.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Slack on top of the upload ceiling for multipart framing overhead.
const MULTIPART_OVERHEAD_BYTES: usize = 4 * 1024;

/// `Path` param for `{uuid}` handlers.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct TierlistPathParams {
    /// Unique identifier of the tierlist.
    pub uuid: Uuid,
}

/// A tier as returned by the API.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierResponse {
    /// Unique tier identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Order value within the tierlist
    pub position: i32,
}

impl From<Tier> for TierResponse {
    fn from(tier: Tier) -> Self {
        Self {
            id: tier.id,
            name: tier.name,
            position: tier.position,
        }
    }
}

/// An entry as returned by the API.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    /// Unique entry identifier
    pub id: i64,
    /// Tierlist the entry belongs to
    pub tierlist_id: Uuid,
    /// Tier the entry is placed in, if any
    pub tier_id: Option<i64>,
    /// Blob key of the entry's image
    pub file_key: String,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            tierlist_id: entry.tierlist_id,
            tier_id: entry.tier_id,
            file_key: entry.file_key,
        }
    }
}

/// Request to create a new tierlist.
#[must_use]
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTierlistRequest {
    /// Display name for the new tierlist.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

/// Response returned after creating a tierlist.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTierlistResponse {
    /// Unique tierlist identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// The default tiers created with the tierlist
    pub tiers: Vec<TierResponse>,
}

/// Creates a tierlist together with its five default tiers.
///
/// The tierlist row and the S/A/B/C/D tiers (positions 0-4) are inserted
/// in one transaction; a failure in the tier sequence rolls the whole
/// bootstrap back and surfaces as a distinct error so callers can tell it
/// apart from name validation.
async fn create_tierlist(
    State(pg_client): State<PgClient>,
    ValidateJson(request): ValidateJson<CreateTierlistRequest>,
) -> Result<(StatusCode, Json<CreateTierlistResponse>)> {
    let mut conn = pg_client.get_connection().await?;
    let new_tierlist = NewTierlist::new(request.name);
    let tierlist_id = new_tierlist.id;

    tracing::info!(
        target: TRACING_TARGET,
        tierlist_id = %tierlist_id,
        "creating tierlist"
    );

    let (tierlist, tiers) = conn
        .transaction(|conn| {
            async move {
                let tierlist = conn.create_tierlist(new_tierlist).await.map_err(|err| {
                    if err.constraint().is_some() {
                        ErrorKind::BadRequest
                            .with_message("Invalid tierlist name")
                            .with_context(err.to_string())
                            .into_static()
                    } else {
                        Error::from(err)
                    }
                })?;

                let mut tiers = Vec::with_capacity(DEFAULT_TIER_NAMES.len());
                for (position, name) in DEFAULT_TIER_NAMES.iter().enumerate() {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        tierlist_id = %tierlist_id,
                        tier = %name,
                        "creating default tier"
                    );

                    let tier = conn
                        .create_tier(NewTier {
                            tierlist_id,
                            name: (*name).to_string(),
                            position: position as i32,
                        })
                        .await
                        .map_err(|err| {
                            tracing::error!(
                                target: TRACING_TARGET,
                                tierlist_id = %tierlist_id,
                                tier = %name,
                                error = %err,
                                "default tier creation failed, rolling back bootstrap"
                            );
                            ErrorKind::DefaultTierCreationFailed.with_resource("tier")
                        })?;

                    tiers.push(tier);
                }

                Ok::<_, Error<'static>>((tierlist, tiers))
            }
            .scope_boxed()
        })
        .await?;

    let response = CreateTierlistResponse {
        id: tierlist.id,
        name: tierlist.name,
        tiers: tiers.into_iter().map(TierResponse::from).collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// A composed tierlist as returned by the API.
///
/// The tiers and unassigned entries are structured JSON regardless of how
/// the store returned them; normalization happens at the store adapter.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierlistResponse {
    /// Unique tierlist identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Tiers ordered by position, each with its nested entries
    pub tiers: serde_json::Value,
    /// Entries not assigned to any tier
    pub unassigned_entries: serde_json::Value,
}

/// Fetches a tierlist with its tiers and unassigned entries.
async fn fetch_tierlist(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<TierlistPathParams>,
) -> Result<Json<TierlistResponse>> {
    let mut conn = pg_client.get_connection().await?;

    let aggregate = conn
        .fetch_tierlist_aggregate(path_params.uuid)
        .await?
        .ok_or_else(|| {
            ErrorKind::NotFound
                .with_message("Couldn't get tierlist")
                .with_resource("tierlist")
                .into_static()
        })?;

    Ok(Json(TierlistResponse {
        id: aggregate.id,
        name: aggregate.name,
        tiers: aggregate.tiers,
        unassigned_entries: aggregate.unassigned_entries,
    }))
}

/// Response returned after a successful upload.
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadEntryResponse {
    /// Identifier of the new entry
    pub id: i64,
    /// Blob key under which the image was stored
    pub filename: String,
}

/// Uploads an image into a tierlist.
///
/// Steps in order: locate the `image` multipart field, bound its size,
/// derive the blob key from the declared filename, write the blob, insert
/// the entry row (unassigned). Validation failures write nothing; a blob
/// write failure aborts before any metadata exists.
async fn upload_entry(
    State(pg_client): State<PgClient>,
    State(storage): State<StorageBackend>,
    Path(path_params): Path<TierlistPathParams>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadEntryResponse>)> {
    let mut image_field = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("image") {
            image_field = Some((
                field.file_name().unwrap_or_default().to_string(),
                field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string(),
                field.bytes().await.map_err(multipart_error)?,
            ));
            break;
        }
    }

    let Some((filename, content_type, data)) = image_field else {
        return Err(ErrorKind::BadRequest
            .with_message("Couldn't retrieve file from request")
            .with_context("multipart field 'image' is required")
            .into_static());
    };

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ErrorKind::PayloadTooLarge
            .with_context(format!(
                "file is {} bytes, the ceiling is {} bytes",
                data.len(),
                MAX_UPLOAD_BYTES
            ))
            .into_static());
    }

    let file_key = generate_blob_key(&filename).map_err(|err| {
        ErrorKind::BadRequest
            .with_message("Filename has no extension")
            .with_context(err.to_string())
            .into_static()
    })?;
    let object_path = format!("{}{}", IMAGES_PREFIX, file_key);

    store_blob(&storage, &object_path, data, &content_type).await?;

    let mut conn = pg_client.get_connection().await?;
    let entry = conn
        .create_entry(NewEntry {
            tierlist_id: path_params.uuid,
            file_key: file_key.clone(),
        })
        .await
        .map_err(|err| {
            // The blob already exists with no referencing entry. Accepted:
            // orphan blobs are tolerated, dangling metadata is not.
            tracing::error!(
                target: TRACING_TARGET,
                tierlist_id = %path_params.uuid,
                key = %object_path,
                error = %err,
                "metadata write failed after blob write, blob is orphaned"
            );
            ErrorKind::InternalServerError
                .with_message("Couldn't save metadata")
                .into_static()
        })?;

    tracing::info!(
        target: TRACING_TARGET,
        entry_id = entry.id,
        tierlist_id = %path_params.uuid,
        key = %object_path,
        "uploaded new entry"
    );

    let response = UploadEntryResponse {
        id: entry.id,
        filename: file_key,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Writes the image blob, failing before any metadata exists.
async fn store_blob(
    storage: &StorageBackend,
    object_path: &str,
    data: Bytes,
    content_type: &str,
) -> Result<()> {
    storage
        .put(object_path, data, content_type)
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                key = %object_path,
                error = %err,
                "failed to upload blob to storage"
            );
            ErrorKind::InternalServerError
                .with_message("Couldn't upload to storage")
                .into_static()
        })
}

/// Converts a multipart read failure into the right error response.
fn multipart_error(err: MultipartError) -> Error<'static> {
    let detail = err.body_text();

    if detail.contains("length limit") {
        ErrorKind::PayloadTooLarge
            .with_context(format!(
                "request body exceeds the {} byte upload ceiling",
                MAX_UPLOAD_BYTES
            ))
            .into_static()
    } else {
        ErrorKind::BadRequest
            .with_message("Invalid multipart data")
            .with_context(detail)
            .into_static()
    }
}

/// Request to move an entry to a tier (or back to unassigned).
#[must_use]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntryRequest {
    /// Identifier of the entry to move.
    pub id: i64,
    /// Target tier; absent or null moves the entry to unassigned.
    #[serde(default)]
    pub tier_id: Option<i64>,
}

/// Moves an entry to a different tier or back to the unassigned set.
///
/// The target tier is not checked against the entry's tierlist; a
/// cross-tierlist move silently succeeds. Concurrent moves of the same
/// entry race at row-update granularity, last write wins.
async fn move_entry(
    State(pg_client): State<PgClient>,
    Path(path_params): Path<TierlistPathParams>,
    Json(request): Json<MoveEntryRequest>,
) -> Result<Json<EntryResponse>> {
    match request.tier_id {
        Some(tier_id) => tracing::info!(
            target: TRACING_TARGET,
            tierlist_id = %path_params.uuid,
            entry_id = request.id,
            tier_id = tier_id,
            "moving entry to tier"
        ),
        None => tracing::info!(
            target: TRACING_TARGET,
            tierlist_id = %path_params.uuid,
            entry_id = request.id,
            "moving entry to unassigned"
        ),
    }

    let mut conn = pg_client.get_connection().await?;
    let entry = conn
        .assign_entry_tier(request.id, request.tier_id)
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET,
                entry_id = request.id,
                error = %err,
                "entry reassignment failed"
            );
            ErrorKind::InternalServerError
                .with_message("Could not move entry to tier")
                .into_static()
        })?
        .ok_or_else(|| {
            // Unknown entry id surfaces the same way as an update failure,
            // matching the stable contract of this endpoint.
            tracing::error!(
                target: TRACING_TARGET,
                entry_id = request.id,
                "entry reassignment affected no rows"
            );
            ErrorKind::InternalServerError
                .with_message("Could not move entry to tier")
                .into_static()
        })?;

    Ok(Json(EntryResponse::from(entry)))
}

/// Returns a [`Router`] with all related routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/tierlist", post(create_tierlist))
        .route("/tierlist/{uuid}", get(fetch_tierlist))
        .route(
            "/tierlist/{uuid}/upload",
            post(upload_entry)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/tierlist/{uuid}/move", post(move_entry))
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::json;

    use crate::handler::test::test_state;

    use super::*;

    fn test_server() -> anyhow::Result<(TestServer, ServiceState)> {
        let state = test_state();
        let server = TestServer::new(routes().with_state(state.clone()))?;
        Ok((server, state))
    }

    #[tokio::test]
    async fn create_rejects_empty_name() -> anyhow::Result<()> {
        let (server, _) = test_server()?;

        let response = server.post("/tierlist").json(&json!({"name": ""})).await;
        response.assert_status_bad_request();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "bad_request");
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_malformed_body() -> anyhow::Result<()> {
        let (server, _) = test_server()?;

        let response = server.post("/tierlist").json(&json!({"title": "x"})).await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn upload_without_image_field_is_rejected() -> anyhow::Result<()> {
        let (server, state) = test_server()?;
        let uuid = Uuid::new_v4();

        let form = MultipartForm::new().add_text("note", "no file here");
        let response = server
            .post(&format!("/tierlist/{}/upload", uuid))
            .multipart(form)
            .await;

        response.assert_status_bad_request();
        assert!(state.storage().list("images/").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn upload_with_dotless_filename_writes_nothing() -> anyhow::Result<()> {
        let (server, state) = test_server()?;
        let uuid = Uuid::new_v4();

        let part = Part::bytes(b"image bytes".to_vec())
            .file_name("noextension")
            .mime_type("image/png");
        let form = MultipartForm::new().add_part("image", part);

        let response = server
            .post(&format!("/tierlist/{}/upload", uuid))
            .multipart(form)
            .await;

        response.assert_status_bad_request();
        assert!(state.storage().list("images/").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn oversize_upload_is_rejected_before_any_write() -> anyhow::Result<()> {
        let (server, state) = test_server()?;
        let uuid = Uuid::new_v4();

        let part = Part::bytes(vec![0u8; MAX_UPLOAD_BYTES + 1])
            .file_name("huge.png")
            .mime_type("image/png");
        let form = MultipartForm::new().add_part("image", part);

        let response = server
            .post(&format!("/tierlist/{}/upload", uuid))
            .multipart(form)
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.storage().list("images/").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn move_rejects_malformed_body() -> anyhow::Result<()> {
        let (server, _) = test_server()?;
        let uuid = Uuid::new_v4();

        let response = server
            .post(&format!("/tierlist/{}/move", uuid))
            .json(&json!({"id": "not a number"}))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[tokio::test]
    async fn fetch_rejects_malformed_uuid() -> anyhow::Result<()> {
        let (server, _) = test_server()?;

        let response = server.get("/tierlist/not-a-uuid").await;
        response.assert_status_bad_request();
        Ok(())
    }

    #[test]
    fn move_request_defaults_tier_to_unassigned() {
        let request: MoveEntryRequest = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(request.tier_id, None);

        let request: MoveEntryRequest =
            serde_json::from_value(json!({"id": 3, "tierId": null})).unwrap();
        assert_eq!(request.tier_id, None);

        let request: MoveEntryRequest =
            serde_json::from_value(json!({"id": 3, "tierId": 9})).unwrap();
        assert_eq!(request.tier_id, Some(9));
    }
}
