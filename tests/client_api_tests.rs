//! Integration tests for the clients endpoints: creation by department,
//! object-level access, the sales-contact side channel, and deletion rules.

mod common;

use axum::http::StatusCode;
use common::{body_json, json_request, setup_test_app, spawn_employee};
use epicevents::models::employee::Department;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn client_payload(siren: &str) -> serde_json::Value {
    json!({
        "company_name": "Société Horizon",
        "siren": siren,
        "first_name": "Luc",
        "last_name": "Moreau",
        "email": "luc@horizon.fr",
        "phone_number": "+33 6 12 34 56 78"
    })
}

#[tokio::test]
async fn sales_employee_creates_client_with_requested_flag_off() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["contract_requested"], false);
    assert_eq!(body["sales_contact"], sales.employee_id.to_string());
    assert_eq!(body["siren"], "452268192");
}

#[tokio::test]
async fn support_employee_cannot_create_client() {
    let (state, app) = setup_test_app().await;
    let support = spawn_employee(&state, 1, Department::Support, "support@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&support.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Vous n'avez pas la permission d'effectuer cette action."
    );
}

#[tokio::test]
async fn invalid_siren_fails_with_field_details() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(client_payload("12AB")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["details"]["siren"][0],
        "La saisie doit comporter uniquement des caractères numériques."
    );
}

#[tokio::test]
async fn duplicate_siren_returns_conflict() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let first = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unassigned_sales_employee_cannot_read_client_detail() {
    let (state, app) = setup_test_app().await;
    let owner = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    let other = spawn_employee(&state, 2, Department::Sales, "autre@epicevents.fr").await;

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&owner.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();
    let client_id = body_json(created).await["id"].as_str().unwrap().to_string();

    let own_view = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/clients/{client_id}"),
            Some(&owner.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(own_view.status(), StatusCode::OK);

    let other_view = app
        .oneshot(json_request(
            "GET",
            &format!("/api/clients/{client_id}"),
            Some(&other.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(other_view.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn staff_reads_any_client_detail() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    let admin = spawn_employee(&state, 2, Department::Management, "chef@epicevents.fr").await;

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();
    let client_id = body_json(created).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/clients/{client_id}"),
            Some(&admin.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn sales_contact_reassignment_is_staff_only() {
    let (state, app) = setup_test_app().await;
    let owner = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    let successor = spawn_employee(&state, 2, Department::Sales, "repreneur@epicevents.fr").await;
    let admin = spawn_employee(&state, 3, Department::Management, "chef@epicevents.fr").await;

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&owner.access_token),
            Some(client_payload("452268192")),
        ))
        .await
        .unwrap();
    let client_id = body_json(created).await["id"].as_str().unwrap().to_string();

    // The assigned contact cannot reassign ownership.
    let denied = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_id}"),
            Some(&owner.access_token),
            Some(json!({ "updated_sales_contact": successor.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::BAD_REQUEST);
    let body = body_json(denied).await;
    assert_eq!(
        body["message"],
        "Vous ne pouvez pas modifier le commercial attribué."
    );

    // Staff can, to another sales employee.
    let allowed = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_id}"),
            Some(&admin.access_token),
            Some(json!({ "updated_sales_contact": successor.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = body_json(allowed).await;
    assert_eq!(body["sales_contact"], successor.employee_id.to_string());

    // But not to a support employee.
    let support = spawn_employee(&state, 4, Department::Support, "support@epicevents.fr").await;
    let wrong_department = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_id}"),
            Some(&admin.access_token),
            Some(json!({ "updated_sales_contact": support.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(wrong_department.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_client_returns_404() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let response = app
        .oneshot(json_request(
            "GET",
            &format!("/api/clients/{}", Uuid::new_v4()),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
