use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{create_department, create_employee, delete, get, send_json, setup_test_app};

#[tokio::test]
async fn test_create_department_defaults_to_active() {
    let app = setup_test_app().await;
    let (status, body) =
        send_json(&app, "POST", "/api/departments", &json!({"name": "  Engineering "})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Engineering");
    assert_eq!(body["data"]["status"], "active");
    assert!(body.get("pagination").is_none());
}

#[tokio::test]
async fn test_create_department_requires_name() {
    let app = setup_test_app().await;
    let (status, body) = send_json(&app, "POST", "/api/departments", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Name is required");
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_create_department_rejects_unknown_status() {
    let app = setup_test_app().await;
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/departments",
        &json!({"name": "Ops", "status": "archived"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Status must be either active or inactive");
}

#[tokio::test]
async fn test_get_department_includes_employee_count() {
    let app = setup_test_app().await;
    let eng = create_department(&app, "Eng").await;
    let empty = create_department(&app, "Empty").await;
    create_employee(&app, eng, "a@example.com", &[]).await;
    create_employee(&app, eng, "b@example.com", &[]).await;

    let (status, body) = get(&app, &format!("/api/departments/{eng}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["employee_count"], 2);

    let (_, body) = get(&app, &format!("/api/departments/{empty}")).await;
    assert_eq!(body["data"]["employee_count"], 0);
}

#[tokio::test]
async fn test_get_department_errors() {
    let app = setup_test_app().await;

    let (status, body) = get(&app, "/api/departments/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Department not found");

    let (status, body) = get(&app, "/api/departments/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid department ID");
}

#[tokio::test]
async fn test_update_department_changes_only_submitted_fields() {
    let app = setup_test_app().await;
    let id = create_department(&app, "Eng").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/api/departments/{id}"),
        &json!({"status": "inactive"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Eng");
    assert_eq!(body["data"]["status"], "inactive");
}

#[tokio::test]
async fn test_update_department_with_no_fields() {
    let app = setup_test_app().await;
    let id = create_department(&app, "Eng").await;

    let (status, body) =
        send_json(&app, "PUT", &format!("/api/departments/{id}"), &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields to update");

    let (status, _) = send_json(&app, "PUT", "/api/departments/999", &json!({"name": "X"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_department() {
    let app = setup_test_app().await;
    let id = create_department(&app, "Eng").await;

    let (status, body) = delete(&app, &format!("/api/departments/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, _) = delete(&app, &format!("/api/departments/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_referenced_department_is_a_storage_fault() {
    let app = setup_test_app().await;
    let id = create_department(&app, "Eng").await;
    let (status, _) = create_employee(&app, id, "a@example.com", &[]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = delete(&app, &format!("/api/departments/{id}")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);

    let (status, _) = get(&app, &format!("/api/departments/{id}")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = setup_test_app().await;
    let (status, body) = get(&app, "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /api/nothing-here not found");
}
