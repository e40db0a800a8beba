use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::domain::FavoriteId;
use super::repository::FavoriteRepository;
use super::service::FavoriteService;
use crate::identity::current_user_from_headers;
use crate::workflows::directory::DirectoryRepository;
use crate::workflows::listings::ListingId;

/// Router builder for the saved-listings ledger.
pub fn favorite_router<F, D>(service: Arc<FavoriteService<F, D>>) -> Router
where
    F: FavoriteRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/favorites", get(saved_handler::<F, D>))
        .route(
            "/api/v1/favorites/:favorite_id",
            delete(remove_handler::<F, D>),
        )
        .route(
            "/api/v1/listings/:listing_id/favorite",
            post(toggle_handler::<F, D>),
        )
        .with_state(service)
}

pub(crate) async fn toggle_handler<F, D>(
    State(service): State<Arc<FavoriteService<F, D>>>,
    headers: HeaderMap,
    Path(listing_id): Path<String>,
) -> Response
where
    F: FavoriteRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.toggle(identity.as_ref(), &ListingId(listing_id)) {
        Ok(is_favorite) => (
            StatusCode::OK,
            axum::Json(json!({ "is_favorite": is_favorite })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn saved_handler<F, D>(
    State(service): State<Arc<FavoriteService<F, D>>>,
    headers: HeaderMap,
) -> Response
where
    F: FavoriteRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.saved(identity.as_ref()) {
        Ok(saved) => (StatusCode::OK, axum::Json(saved)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn remove_handler<F, D>(
    State(service): State<Arc<FavoriteService<F, D>>>,
    headers: HeaderMap,
    Path(favorite_id): Path<String>,
) -> Response
where
    F: FavoriteRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.remove(identity.as_ref(), &FavoriteId(favorite_id)) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "deleted": true }))).into_response(),
        Err(err) => err.into_response(),
    }
}
