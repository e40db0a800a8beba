//! Blob storage boundary. The marketplace never serves image bytes itself:
//! it uploads to an external blob store and keeps only the returned public
//! URL verbatim on the listing record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::identity::{current_user_from_headers, CurrentUser};
use crate::workflows::directory::DirectoryRepository;
use crate::workflows::error::WorkflowError;
use crate::workflows::guard::AccessGuard;

/// Bucket holding listing gallery images.
pub const LISTING_IMAGE_BUCKET: &str = "listing-images";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob backend failed: {0}")]
    Backend(String),
}

impl From<BlobError> for WorkflowError {
    fn from(value: BlobError) -> Self {
        WorkflowError::Store(crate::store::StoreError::Unavailable(value.to_string()))
    }
}

/// Upload boundary to the external blob store. The returned URL is opaque;
/// the marketplace stores and serves it verbatim.
pub trait BlobGateway: Send + Sync {
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, BlobError>;
}

/// In-memory blob store backing tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    base_url: String,
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().expect("blob mutex poisoned").len()
    }
}

impl BlobGateway for MemoryBlobStore {
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        _content_type: &str,
    ) -> Result<String, BlobError> {
        let path = format!("{bucket}/{key}");
        self.objects
            .lock()
            .map_err(|_| BlobError::Backend("blob mutex poisoned".to_string()))?
            .insert(path.clone(), bytes.to_vec());
        Ok(format!("{}/{path}", self.base_url.trim_end_matches('/')))
    }
}

static UPLOAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Service staging listing images ahead of the final listing save. The
/// client accumulates the returned URLs and persists them as one field with
/// the rest of the listing.
pub struct MediaService<B, D> {
    blobs: Arc<B>,
    guard: AccessGuard<D>,
}

impl<B, D> MediaService<B, D>
where
    B: BlobGateway,
    D: DirectoryRepository,
{
    pub fn new(blobs: Arc<B>, directory: Arc<D>) -> Self {
        let guard = AccessGuard::new(directory);
        Self { blobs, guard }
    }

    /// Upload one gallery image. Advertisers and admins only.
    pub fn stage_listing_image(
        &self,
        identity: Option<&CurrentUser>,
        filename: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, WorkflowError> {
        let owner = self.guard.require_advertiser(identity)?;
        let sequence = UPLOAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let safe_name: String = filename
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        let key = format!("{}/{sequence:06}-{safe_name}", owner.id);
        let url = self
            .blobs
            .upload(LISTING_IMAGE_BUCKET, &key, bytes, content_type)?;
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    filename: String,
}

/// Router builder for image staging.
pub fn media_router<B, D>(service: Arc<MediaService<B, D>>) -> Router
where
    B: BlobGateway + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/media/listing-images", post(upload_handler::<B, D>))
        .with_state(service)
}

pub(crate) async fn upload_handler<B, D>(
    State(service): State<Arc<MediaService<B, D>>>,
    headers: HeaderMap,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Response
where
    B: BlobGateway + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");
    match service.stage_listing_image(identity.as_ref(), &query.filename, &body, content_type) {
        Ok(url) => (StatusCode::CREATED, axum::Json(json!({ "url": url }))).into_response(),
        Err(err) => err.into_response(),
    }
}
