#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::Value;
use staff_registry::photo::PhotoStore;
use staff_registry::{AppState, build_app, db};
use tower::ServiceExt;

pub const BOUNDARY: &str = "staff-registry-test-boundary";

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = db::connect("sqlite::memory:", 1).await?;
    db::migrate(&db).await?;
    Ok(db)
}

/// Photo store that keeps everything in memory and remembers removals.
#[derive(Default)]
pub struct MemoryPhotoStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    removed: Mutex<Vec<String>>,
}

impl MemoryPhotoStore {
    pub fn stored(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoStore for MemoryPhotoStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
        self.files
            .lock()
            .unwrap()
            .insert(filename.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn remove(&self, filename: &str) -> std::io::Result<()> {
        self.files.lock().unwrap().remove(filename);
        self.removed.lock().unwrap().push(filename.to_string());
        Ok(())
    }
}

/// Photo store whose disk is always full.
pub struct FailingPhotoStore;

#[async_trait]
impl PhotoStore for FailingPhotoStore {
    async fn save(&self, _filename: &str, _bytes: &[u8]) -> std::io::Result<()> {
        Err(std::io::Error::other("no space left on device"))
    }

    async fn remove(&self, _filename: &str) -> std::io::Result<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub photos: Arc<MemoryPhotoStore>,
}

pub async fn setup_test_app() -> TestApp {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let photos = Arc::new(MemoryPhotoStore::default());
    let state = AppState::new(db.clone(), photos.clone());
    let router = build_app(state, std::env::temp_dir());
    TestApp { router, db, photos }
}

/// Same as [`setup_test_app`], but photos go to `store`.
pub async fn setup_test_app_with_store(store: Arc<dyn PhotoStore>) -> TestApp {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let router = build_app(AppState::new(db.clone(), store), std::env::temp_dir());
    TestApp {
        router,
        db,
        photos: Arc::new(MemoryPhotoStore::default()),
    }
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn send_json(app: &TestApp, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn send_form(app: &TestApp, method: &str, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn create_department(app: &TestApp, name: &str) -> i64 {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/departments",
        &serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_i64().unwrap()
}

/// Field values for a valid employee; override entries by name.
pub fn employee_fields<'a>(
    department_id: &'a str,
    email: &'a str,
    overrides: &[(&'a str, &'a str)],
) -> Vec<(&'a str, &'a str)> {
    let mut fields = vec![
        ("department_id", department_id),
        ("name", "Ann Lee"),
        ("dob", "1990-01-01"),
        ("phone", "+15551234567"),
        ("email", email),
        ("salary", "50000"),
        ("status", "active"),
    ];
    for &(key, value) in overrides {
        match fields.iter_mut().find(|(k, _)| *k == key) {
            Some(field) => field.1 = value,
            None => fields.push((key, value)),
        }
    }
    fields
}

pub async fn create_employee(
    app: &TestApp,
    department_id: i64,
    email: &str,
    overrides: &[(&str, &str)],
) -> (StatusCode, Value) {
    let department = department_id.to_string();
    let fields = employee_fields(&department, email, overrides);
    let parts: Vec<Part<'_>> = fields.iter().map(|(k, v)| Part::Text(*k, *v)).collect();
    send_form(app, "POST", "/api/employees", &parts).await
}
