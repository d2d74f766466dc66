//! Router assembly: API routes, the documentation UI and static photos.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, http::Uri};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::errors::ApiError;
use crate::handlers::{departments, employees};
use crate::openapi::ApiDoc;
use crate::photo::{MAX_PHOTO_BYTES, PhotoStore, UPLOADS_PREFIX};

/// Room for the form fields travelling next to a full-size photo.
const BODY_LIMIT: usize = MAX_PHOTO_BYTES + 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub photos: Arc<dyn PhotoStore>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, photos: Arc<dyn PhotoStore>) -> Self {
        Self { db, photos }
    }
}

/// The API routes with their OpenAPI description, before state is attached.
pub fn api_router() -> OpenApiRouter<AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(
            departments::list_departments,
            departments::create_department
        ))
        .routes(routes!(
            departments::get_department,
            departments::update_department,
            departments::delete_department
        ))
        .routes(routes!(employees::list_employees, employees::create_employee))
        .routes(routes!(employees::employee_stats))
        .routes(routes!(
            employees::get_employee,
            employees::update_employee,
            employees::delete_employee
        ))
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {}", uri.path()))
}

/// Full application: API under `/api`, Scalar docs at `/docs` and stored
/// photos under `/uploads`.
pub fn build_app(state: AppState, upload_dir: impl Into<PathBuf>) -> Router {
    let (router, api) = api_router().split_for_parts();

    router
        .merge(Scalar::with_url("/docs", api))
        .nest_service(UPLOADS_PREFIX, ServeDir::new(upload_dir.into()))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
