use axum::extract::{
    Multipart, Path, Query, State,
    multipart::MultipartRejection,
    rejection::{PathRejection, QueryRejection},
};
use utoipa::ToSchema;

use super::{read_employee_form, today};
use crate::errors::ApiError;
use crate::messages::employees as msg;
use crate::models::EmployeeListQuery;
use crate::response::{ApiResponse, Envelope, ErrorEnvelope};
use crate::routes::AppState;
use crate::services::{
    DeletedRecord,
    employee::{self, Employee, EmployeeFilters, EmployeePatch, NewEmployee},
};
use crate::statistics::{self, EmployeeStats};

/// Multipart form accepted by create and update. Update takes any subset
/// of the fields and ignores `email`.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct EmployeeForm {
    #[schema(example = 1)]
    department_id: i32,
    #[schema(example = "Ann Lee")]
    name: String,
    #[schema(example = "1990-04-12")]
    dob: String,
    #[schema(example = "+15551234567")]
    phone: String,
    #[schema(example = "ann@example.com")]
    email: String,
    #[schema(example = 72000)]
    salary: f64,
    #[schema(example = "active")]
    status: String,
    /// `.jpg`, `.jpeg` or `.png`, at most 5 MiB.
    #[schema(value_type = Option<String>, format = Binary)]
    photo: Option<Vec<u8>>,
}

fn employee_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::bad_request(msg::INVALID_ID))
}

fn multipart(form: Result<Multipart, MultipartRejection>) -> Result<Multipart, ApiError> {
    form.map_err(|e| ApiError::bad_request(e.body_text()))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "employees",
    params(EmployeeListQuery),
    responses(
        (status = OK, description = "One page of employees with department names", body = Envelope<Vec<Employee>>),
        (status = BAD_REQUEST, description = "Unknown status filter", body = ErrorEnvelope),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to fetch employees", body = ErrorEnvelope)
    ),
    summary = "List employees",
    description = "Filters by `status`, `department` id and a case-insensitive `search` on name or email. Rows are ordered newest first."
)]
pub async fn list_employees(
    State(state): State<AppState>,
    query: Result<Query<EmployeeListQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Employee>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (common, department) = query.filters()?;
    let filters = EmployeeFilters { common, department };
    let page = employee::list(&state.db, &filters, query.page_request()).await?;
    Ok(ApiResponse::paginated(msg::FETCHED, page))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "employees",
    request_body(content = EmployeeForm, content_type = "multipart/form-data"),
    responses(
        (status = CREATED, description = "Employee created", body = Envelope<Employee>),
        (status = BAD_REQUEST, description = "Validation failed, email already exists or invalid department", body = ErrorEnvelope),
        (status = INTERNAL_SERVER_ERROR, description = "Storage fault", body = ErrorEnvelope)
    ),
    summary = "Create an employee"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Employee>, ApiError> {
    let (fields, photo) = read_employee_form(multipart(form)?).await?;
    let new = NewEmployee::from_form(&fields, today())?;
    let created = employee::create(&state.db, state.photos.as_ref(), new, photo).await?;
    Ok(ApiResponse::created(msg::CREATED, created))
}

#[utoipa::path(
    get,
    path = "/api/employees/stats",
    tag = "employees",
    responses(
        (status = OK, description = "Highest salary per department, salary range counts and youngest employee per department", body = Envelope<EmployeeStats>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to fetch employee statistics", body = ErrorEnvelope)
    ),
    summary = "Employee statistics"
)]
pub async fn employee_stats(
    State(state): State<AppState>,
) -> Result<ApiResponse<EmployeeStats>, ApiError> {
    let stats = statistics::employee_stats(&state.db, today()).await?;
    Ok(ApiResponse::ok(msg::STATS, stats))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = OK, description = "The employee with its department name", body = Envelope<Employee>),
        (status = BAD_REQUEST, description = "Invalid employee ID", body = ErrorEnvelope),
        (status = NOT_FOUND, description = "Employee not found", body = ErrorEnvelope)
    ),
    summary = "Get one employee"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<Employee>, ApiError> {
    let id = employee_id(path)?;
    let found = employee::find(&state.db, id).await?;
    Ok(ApiResponse::ok(msg::FETCHED_ONE, found))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    request_body(content = EmployeeForm, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "Employee updated", body = Envelope<Employee>),
        (status = BAD_REQUEST, description = "Validation failed, invalid department or no fields to update", body = ErrorEnvelope),
        (status = NOT_FOUND, description = "Employee not found", body = ErrorEnvelope)
    ),
    summary = "Update an employee",
    description = "Only the submitted fields change. A new photo replaces the previous file."
)]
pub async fn update_employee(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Employee>, ApiError> {
    let id = employee_id(path)?;
    let (fields, photo) = read_employee_form(multipart(form)?).await?;
    let patch = EmployeePatch::from_form(&fields, today())?;
    let updated = employee::update(&state.db, state.photos.as_ref(), id, patch, photo).await?;
    Ok(ApiResponse::ok(msg::UPDATED, updated))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = OK, description = "Employee deleted", body = Envelope<DeletedRecord>),
        (status = NOT_FOUND, description = "Employee not found", body = ErrorEnvelope)
    ),
    summary = "Delete an employee"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<ApiResponse<DeletedRecord>, ApiError> {
    let id = employee_id(path)?;
    let deleted = employee::delete(&state.db, state.photos.as_ref(), id).await?;
    Ok(ApiResponse::ok(msg::DELETED, deleted))
}
