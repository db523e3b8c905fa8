//! Shared helpers for the integration suites: an in-memory database with
//! migrations applied, the full router, and request plumbing.

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use epicevents::auth::{self, TokenKind};
use epicevents::config::AppConfig;
use epicevents::models::employee::Department;
use epicevents::repositories::EmployeeRepository;
use epicevents::repositories::employee::CreateEmployeeRequest;
use epicevents::server::{AppState, create_app, create_test_app_state};
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use uuid::Uuid;

pub const PASSWORD: &str = "un-mot-de-passe";

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret-of-32-bytes!".to_string(),
        ..Default::default()
    }
}

pub async fn setup_test_app() -> (AppState, Router) {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.expect("Failed to init test DB");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = create_test_app_state(test_config(), db);
    let app = create_app(state.clone());
    (state, app)
}

/// Seeded employee with the ids and a ready-to-use bearer token.
pub struct TestEmployee {
    pub employee_id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
}

pub async fn spawn_employee(
    state: &AppState,
    number: i32,
    department: Department,
    email: &str,
) -> TestEmployee {
    let repo = EmployeeRepository::new(&state.db);
    let (employee, user) = repo
        .create_employee(CreateEmployeeRequest {
            employee_number: number,
            first_name: "Claire".to_string(),
            last_name: "Fontaine".to_string(),
            department,
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("Failed to seed employee");

    let access = auth::issue_token(&state.config, user.id, TokenKind::Access)
        .expect("Failed to issue token");

    TestEmployee {
        employee_id: employee.id,
        user_id: user.id,
        access_token: access.token,
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let body = body
        .map(|value| Body::from(value.to_string()))
        .unwrap_or_else(Body::empty);

    builder.body(body).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
