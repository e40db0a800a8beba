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

use super::domain::RoleRequestId;
use super::repository::RoleRequestRepository;
use super::service::RoleRequestService;
use crate::identity::current_user_from_headers;
use crate::workflows::directory::DirectoryRepository;

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NotesRequest {
    notes: String,
}

/// Router builder for the advertiser-upgrade requests: the user-facing
/// submit/own-request pair and the admin review console.
pub fn role_request_router<R, D>(service: Arc<RoleRequestService<R, D>>) -> Router
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/role-requests",
            post(submit_handler::<R, D>).get(own_request_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/role-requests",
            get(pending_queue_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/role-requests/:request_id",
            delete(delete_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/role-requests/:request_id/approve",
            post(approve_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/role-requests/:request_id/reject",
            post(reject_handler::<R, D>),
        )
        .route(
            "/api/v1/admin/role-requests/:request_id/notes",
            put(edit_notes_handler::<R, D>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.submit(identity.as_ref(), request.reason) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn own_request_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.own_request(identity.as_ref()) {
        Ok(latest) => (StatusCode::OK, axum::Json(latest)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn pending_queue_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.pending_queue(identity.as_ref()) {
        Ok(queue) => (StatusCode::OK, axum::Json(queue)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn approve_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.approve(identity.as_ref(), &RoleRequestId(request_id)) {
        Ok(approved) => (StatusCode::OK, axum::Json(approved)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn reject_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    axum::Json(request): axum::Json<NotesRequest>,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.reject(identity.as_ref(), &RoleRequestId(request_id), request.notes) {
        Ok(rejected) => (StatusCode::OK, axum::Json(rejected)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn edit_notes_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
    axum::Json(request): axum::Json<NotesRequest>,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.edit_notes(identity.as_ref(), &RoleRequestId(request_id), request.notes) {
        Ok(updated) => (StatusCode::OK, axum::Json(updated)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_handler<R, D>(
    State(service): State<Arc<RoleRequestService<R, D>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    R: RoleRequestRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.delete(identity.as_ref(), &RoleRequestId(request_id)) {
        Ok(()) => (StatusCode::OK, axum::Json(json!({ "deleted": true }))).into_response(),
        Err(err) => err.into_response(),
    }
}
