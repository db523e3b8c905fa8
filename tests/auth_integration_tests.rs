//! Integration tests for login, refresh, and logout.

mod common;

use axum::http::StatusCode;
use common::{PASSWORD, body_json, json_request, setup_test_app, spawn_employee};
use epicevents::models::employee::Department;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn login_returns_access_and_refresh_tokens() {
    let (state, app) = setup_test_app().await;
    spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "claire@epicevents.fr", "password": PASSWORD })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access"].as_str().is_some());
    assert!(body["refresh"].as_str().is_some());
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let (state, app) = setup_test_app().await;
    spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "claire@epicevents.fr", "password": "mauvais" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_unknown_email_returns_401() {
    let (_state, app) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "inconnu@epicevents.fr", "password": PASSWORD })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_exchanges_token_for_new_access() {
    let (state, app) = setup_test_app().await;
    spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "claire@epicevents.fr", "password": PASSWORD })),
        ))
        .await
        .unwrap();
    let tokens = body_json(login).await;
    let refresh = tokens["refresh"].as_str().unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access"].as_str().is_some());
}

#[tokio::test]
async fn access_token_is_rejected_as_refresh_token() {
    let (state, app) = setup_test_app().await;
    let employee = spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login/refresh",
            None,
            Some(json!({ "refresh": employee.access_token })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_revokes_outstanding_refresh_tokens() {
    let (state, app) = setup_test_app().await;
    spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "claire@epicevents.fr", "password": PASSWORD })),
        ))
        .await
        .unwrap();
    let tokens = body_json(login).await;
    let access = tokens["access"].as_str().unwrap().to_string();
    let refresh = tokens["refresh"].as_str().unwrap().to_string();

    let logout = app
        .clone()
        .oneshot(json_request("POST", "/api/logout", Some(&access), None))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::RESET_CONTENT);

    // The refresh token no longer works once blacklisted.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login/refresh",
            None,
            Some(json!({ "refresh": refresh })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_without_token_returns_401() {
    let (_state, app) = setup_test_app().await;

    let response = app
        .oneshot(json_request("GET", "/api/clients", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_with_garbage_token_returns_401() {
    let (_state, app) = setup_test_app().await;

    let response = app
        .oneshot(json_request(
            "GET",
            "/api/clients",
            Some("INVALIDTOKEN"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inactive_user_cannot_login() {
    let (state, app) = setup_test_app().await;
    let employee = spawn_employee(&state, 1, Department::Sales, "claire@epicevents.fr").await;

    // Deactivate through the staff update path.
    let admin = spawn_employee(&state, 2, Department::Management, "chef@epicevents.fr").await;
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/employees/{}", employee.employee_id),
            Some(&admin.access_token),
            Some(json!({ "user": { "is_active": false } })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let login = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "claire@epicevents.fr", "password": PASSWORD })),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
}
