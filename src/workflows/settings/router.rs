use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Router,
};

use super::domain::SettingsUpdate;
use super::repository::SettingsRepository;
use super::service::SettingsService;
use crate::identity::current_user_from_headers;
use crate::workflows::directory::DirectoryRepository;

/// Router builder for the site configuration singleton.
pub fn settings_router<S, D>(service: Arc<SettingsService<S, D>>) -> Router
where
    S: SettingsRepository + 'static,
    D: DirectoryRepository + 'static,
{
    Router::new()
        .route("/api/v1/settings", get(site_handler::<S, D>))
        .route("/api/v1/admin/settings", put(update_handler::<S, D>))
        .with_state(service)
}

pub(crate) async fn site_handler<S, D>(
    State(service): State<Arc<SettingsService<S, D>>>,
) -> Response
where
    S: SettingsRepository + 'static,
    D: DirectoryRepository + 'static,
{
    match service.site() {
        Ok(settings) => (StatusCode::OK, axum::Json(settings)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_handler<S, D>(
    State(service): State<Arc<SettingsService<S, D>>>,
    headers: HeaderMap,
    axum::Json(update): axum::Json<SettingsUpdate>,
) -> Response
where
    S: SettingsRepository + 'static,
    D: DirectoryRepository + 'static,
{
    let identity = current_user_from_headers(&headers);
    match service.update(identity.as_ref(), update) {
        Ok(settings) => (StatusCode::OK, axum::Json(settings)).into_response(),
        Err(err) => err.into_response(),
    }
}
