use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AccountStatus, ContactUpdate, UserRole};
use super::repository::DirectoryRepository;
use super::service::DirectoryService;
use crate::identity::{current_user_from_headers, UserId};

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleChangeRequest {
    role: UserRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChangeRequest {
    status: AccountStatus,
}

/// Router builder exposing registration, self-service profile edits, and
/// the admin account console.
pub fn directory_router<D>(service: Arc<DirectoryService<D>>) -> Router
where
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/accounts/register", post(register_handler::<D>))
        .route(
            "/api/v1/profile",
            get(profile_handler::<D>).put(update_profile_handler::<D>),
        )
        .route("/api/v1/admin/users", get(roster_handler::<D>))
        .route(
            "/api/v1/admin/users/:user_id",
            delete(delete_account_handler::<D>),
        )
        .route(
            "/api/v1/admin/users/:user_id/role",
            put(set_role_handler::<D>),
        )
        .route(
            "/api/v1/admin/users/:user_id/status",
            put(set_status_handler::<D>),
        )
        .route(
            "/api/v1/admin/users/:user_id/degrade",
            post(degrade_handler::<D>),
        )
        .with_state(service)
}

pub(crate) async fn register_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<RegisterRequest>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.register(identity.as_ref(), request.full_name) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn profile_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.profile(identity.as_ref()) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_profile_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<ContactUpdate>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.update_own_profile(identity.as_ref(), update) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn roster_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.roster(identity.as_ref()) {
        Ok(profiles) => (StatusCode::OK, axum::Json(profiles)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn set_role_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<RoleChangeRequest>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.set_role(identity.as_ref(), &UserId(user_id), request.role) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn set_status_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    axum::Json(request): axum::Json<StatusChangeRequest>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.set_status(identity.as_ref(), &UserId(user_id), request.status) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn degrade_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.degrade(identity.as_ref(), &UserId(user_id)) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_account_handler<D>(
    State(service): State<Arc<DirectoryService<D>>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response
where
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.delete_account(identity.as_ref(), &UserId(user_id)) {
        Ok(purge) => {
            let payload = json!({
                "deleted": true,
                "listings_removed": purge.listings_removed,
                "favorites_removed": purge.favorites_removed,
                "requests_removed": purge.requests_removed,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
