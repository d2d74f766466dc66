//! The `{success, message, data}` envelope every endpoint responds with.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::pagination::Page;

/// Pagination block attached to list responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
    pub pagination: Option<PaginationMeta>,
}

impl<T> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
        }
    }
}

/// Failure envelope. `data` is always an empty object.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: serde_json::Map::new(),
        }
    }
}

/// A successful envelope paired with its status code.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: Envelope::success(message, data),
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: Envelope::success(message, data),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn envelope(&self) -> &Envelope<T> {
        &self.body
    }
}

impl<R> ApiResponse<Vec<R>> {
    /// List response: rows go to `data`, counts go to `pagination`.
    pub fn paginated(message: impl Into<String>, page: Page<R>) -> Self {
        let meta = page.meta();
        let mut body = Envelope::success(message, page.rows);
        body.pagination = Some(meta);
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_pagination() {
        let body = Envelope::success("Department fetched successfully", json!({"id": 1}));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": true,
                "message": "Department fetched successfully",
                "data": {"id": 1}
            })
        );
    }

    #[test]
    fn paginated_envelope_carries_meta() {
        let page = Page {
            rows: vec![1, 2, 3],
            total: 13,
            page: 2,
            limit: 3,
        };
        let response = ApiResponse::paginated("ok", page);
        assert_eq!(response.status(), StatusCode::OK);
        let value = serde_json::to_value(response.envelope()).unwrap();
        assert_eq!(
            value["pagination"],
            json!({"total": 13, "page": 2, "limit": 3, "totalPages": 5})
        );
        assert_eq!(value["data"], json!([1, 2, 3]));
    }

    #[test]
    fn error_envelope_has_empty_data() {
        let body = ErrorEnvelope::new("Employee not found");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"success": false, "message": "Employee not found", "data": {}})
        );
    }
}
