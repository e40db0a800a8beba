use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ListingDraft, ListingFilters, ListingId, SubmissionMode};
use super::repository::ListingRepository;
use super::service::ListingService;
use crate::identity::current_user_from_headers;
use crate::workflows::directory::DirectoryRepository;

#[derive(Debug, Deserialize)]
pub(crate) struct CreateListingRequest {
    #[serde(flatten)]
    draft: ListingDraft,
    #[serde(default = "default_mode")]
    as_status: SubmissionMode,
}

fn default_mode() -> SubmissionMode {
    SubmissionMode::Bozza
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RejectRequest {
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExpireRequest {
    #[serde(default)]
    as_of: Option<DateTime<Utc>>,
}

/// Router builder for the public catalogue, the advertiser dashboard, and
/// the admin moderation console.
pub fn listing_router<L, D>(service: Arc<ListingService<L, D>>) -> Router
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(search_handler::<L, D>).post(create_handler::<L, D>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(detail_handler::<L, D>)
                .put(update_handler::<L, D>)
                .delete(delete_handler::<L, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/submit",
            post(submit_handler::<L, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/views",
            post(increment_view_handler::<L, D>),
        )
        .route("/api/v1/my/listings", get(own_listings_handler::<L, D>))
        .route(
            "/api/v1/admin/listings/queue",
            get(moderation_queue_handler::<L, D>),
        )
        .route(
            "/api/v1/admin/listings/overview",
            get(overview_handler::<L, D>),
        )
        .route(
            "/api/v1/admin/listings/expire",
            post(expire_handler::<L, D>),
        )
        .route(
            "/api/v1/admin/listings/:listing_id/approve",
            post(approve_handler::<L, D>),
        )
        .route(
            "/api/v1/admin/listings/:listing_id/reject",
            post(reject_handler::<L, D>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<CreateListingRequest>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.create(identity.as_ref(), request.draft, request.as_status) {
        Ok(listing) => (StatusCode::CREATED, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn search_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    Query(filters): Query<ListingFilters>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    match service.search(&filters) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn detail_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.detail(identity.as_ref(), &ListingId(listing_id)) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    axum::Json(draft): axum::Json<ListingDraft>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.update(identity.as_ref(), &ListingId(listing_id), draft) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.delete(identity.as_ref(), &ListingId(listing_id)) {
        Ok(purge) => (
            StatusCode::OK,
            axum::Json(json!({
                "deleted": true,
                "favorites_removed": purge.favorites_removed,
            })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn submit_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.submit(identity.as_ref(), &ListingId(listing_id)) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn increment_view_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    match service.increment_view(&ListingId(listing_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(json!({ "views": views }))).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn own_listings_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.own_listings(identity.as_ref()) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn moderation_queue_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.moderation_queue(identity.as_ref()) {
        Ok(listings) => (StatusCode::OK, axum::Json(listings)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn overview_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.overview(identity.as_ref()) {
        Ok(counts) => (StatusCode::OK, axum::Json(counts)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.approve(identity.as_ref(), &ListingId(listing_id)) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
    axum::Json(request): axum::Json<RejectRequest>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.reject(identity.as_ref(), &ListingId(listing_id), request.note) {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn expire_handler<L, D>(
    State(service): State<Arc<ListingService<L, D>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ExpireRequest>,
) -> Response
where
    L: ListingRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    let as_of = request.as_of.unwrap_or_else(Utc::now);
    match service.expire_overdue(identity.as_ref(), as_of) {
        Ok(expired) => (StatusCode::OK, axum::Json(json!({ "expired": expired }))).into_response(),
        Err(err) => err.into_response(),
    }
}
