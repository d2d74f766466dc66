use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};

use crate::errors::ApiError;
use crate::messages::departments as msg;
use crate::models::DepartmentListQuery;
use crate::response::{ApiResponse, Envelope, ErrorEnvelope};
use crate::routes::AppState;
use crate::services::{
    DeletedRecord,
    department::{
        self, Department, DepartmentPatch, DepartmentPayload, DepartmentSummary,
        DepartmentUpdatePayload, NewDepartment,
    },
};

fn department_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request(msg::INVALID_ID))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    tag = "departments",
    params(DepartmentListQuery),
    responses(
        (status = OK, description = "One page of departments with employee counts", body = Envelope<Vec<DepartmentSummary>>),
        (status = BAD_REQUEST, description = "Unknown status filter", body = ErrorEnvelope),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to fetch departments", body = ErrorEnvelope)
    ),
    summary = "List departments",
    description = "Filters by `status` and a case-insensitive `search` on the name. Rows are ordered newest first."
)]
pub async fn list_departments(
    State(state): State<AppState>,
    query: Result<Query<DepartmentListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<DepartmentSummary>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let filters = query.filters()?;
    let page = department::list(&state.db, &filters, query.page_request()).await?;
    Ok(ApiResponse::paginated(msg::FETCHED, page))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = "departments",
    request_body = DepartmentPayload,
    responses(
        (status = CREATED, description = "Department created", body = Envelope<Department>),
        (status = BAD_REQUEST, description = "Validation failed", body = ErrorEnvelope),
        (status = INTERNAL_SERVER_ERROR, description = "Storage fault", body = ErrorEnvelope)
    ),
    summary = "Create a department"
)]
pub async fn create_department(
    State(state): State<AppState>,
    payload: Result<Json<DepartmentPayload>, JsonRejection>,
) -> Result<ApiResponse<Department>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let new = NewDepartment::try_from(payload)?;
    let created = department::create(&state.db, new).await?;
    Ok(ApiResponse::created(msg::CREATED, created))
}

#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = "departments",
    params(("id" = i32, Path, description = "Department id")),
    responses(
        (status = OK, description = "The department with its employee count", body = Envelope<DepartmentSummary>),
        (status = BAD_REQUEST, description = "Invalid department ID", body = ErrorEnvelope),
        (status = NOT_FOUND, description = "Department not found", body = ErrorEnvelope)
    ),
    summary = "Get one department"
)]
pub async fn get_department(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<DepartmentSummary>, ApiError> {
    let id = department_id(path)?;
    let found = department::find(&state.db, id).await?;
    Ok(ApiResponse::ok(msg::FETCHED_ONE, found))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = "departments",
    params(("id" = i32, Path, description = "Department id")),
    request_body = DepartmentUpdatePayload,
    responses(
        (status = OK, description = "Department updated", body = Envelope<Department>),
        (status = BAD_REQUEST, description = "Validation failed or no fields to update", body = ErrorEnvelope),
        (status = NOT_FOUND, description = "Department not found", body = ErrorEnvelope)
    ),
    summary = "Update a department",
    description = "Only the submitted fields change."
)]
pub async fn update_department(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DepartmentUpdatePayload>, JsonRejection>,
) -> Result<ApiResponse<Department>, ApiError> {
    let id = department_id(path)?;
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let patch = DepartmentPatch::try_from(payload)?;
    let updated = department::update(&state.db, id, patch).await?;
    Ok(ApiResponse::ok(msg::UPDATED, updated))
}

#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = "departments",
    params(("id" = i32, Path, description = "Department id")),
    responses(
        (status = OK, description = "Department deleted", body = Envelope<DeletedRecord>),
        (status = NOT_FOUND, description = "Department not found", body = ErrorEnvelope),
        (status = INTERNAL_SERVER_ERROR, description = "Storage fault, e.g. employees still reference it", body = ErrorEnvelope)
    ),
    summary = "Delete a department"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<DeletedRecord>, ApiError> {
    let id = department_id(path)?;
    let deleted = department::delete(&state.db, id).await?;
    Ok(ApiResponse::ok(msg::DELETED, deleted))
}
