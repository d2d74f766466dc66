use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::Status;
use crate::errors::ApiError;
use crate::pagination::{PageRequest, parse_positive};

/// Query parameters for listing departments.
///
/// Numeric values are read leniently: missing, empty, non-numeric or
/// non-positive `page`/`limit` fall back to 1 and 10.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentListQuery {
    /// Page number, starting at 1.
    #[param(example = "1")]
    pub page: Option<String>,
    /// Rows per page.
    #[param(example = "10")]
    pub limit: Option<String>,
    /// `active` or `inactive`.
    #[param(example = "active")]
    pub status: Option<String>,
    /// Case-insensitive substring of the department name.
    pub search: Option<String>,
}

/// Query parameters for listing employees.
///
/// `search` matches the employee name or email. `department` keeps only
/// employees of that department id.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    #[param(example = "1")]
    pub page: Option<String>,
    #[param(example = "10")]
    pub limit: Option<String>,
    #[param(example = "inactive")]
    pub status: Option<String>,
    #[param(example = "ann")]
    pub search: Option<String>,
    /// Department id.
    #[param(example = "3")]
    pub department: Option<String>,
}

/// Criteria shared by both list endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonFilters {
    pub status: Option<Status>,
    pub search: Option<String>,
}

impl DepartmentListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn filters(&self) -> Result<CommonFilters, ApiError> {
        common_filters(self.status.as_deref(), self.search.as_deref())
    }
}

impl EmployeeListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }

    pub fn filters(&self) -> Result<(CommonFilters, Option<i32>), ApiError> {
        let common = common_filters(self.status.as_deref(), self.search.as_deref())?;
        let department = parse_positive(self.department.as_deref())
            .and_then(|id| i32::try_from(id).ok());
        Ok((common, department))
    }
}

/// Blank values count as absent; a non-blank unknown status is rejected.
fn common_filters(status: Option<&str>, search: Option<&str>) -> Result<CommonFilters, ApiError> {
    let status = status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<Status>)
        .transpose()
        .map_err(|e| ApiError::validation_failed(vec![e.to_string()]))?;
    let search = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    Ok(CommonFilters { status, search })
}
