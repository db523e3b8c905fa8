//! Integration tests for the contract and event lifecycle gates.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{TestEmployee, body_json, json_request, setup_test_app, spawn_employee};
use epicevents::models::employee::Department;
use epicevents::server::AppState;
use serde_json::json;
use tower::ServiceExt;

async fn create_client(app: &axum::Router, sales: &TestEmployee, siren: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(json!({ "company_name": "Société Lumière", "siren": siren })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn request_contract(app: &axum::Router, token: &str, client_id: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_id}"),
            Some(token),
            Some(json!({ "contract_requested": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn create_contract(app: &axum::Router, token: &str, client_id: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts"),
            Some(token),
            Some(json!({
                "contract_description": "Contrat pour la soirée annuelle.",
                "amount": 1452.25,
                "payment_due": 1452.25
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn sign_contract(app: &axum::Router, token: &str, client_id: &str, contract_id: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_id}/contracts/{contract_id}"),
            Some(token),
            Some(json!({ "is_signed": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

fn event_payload() -> serde_json::Value {
    let start = Utc::now() + Duration::days(30);
    json!({
        "event_name": "Soirée annuelle",
        "start_date": start.to_rfc3339(),
        "end_date": (start + Duration::hours(6)).to_rfc3339(),
        "attendees": 120,
        "notes": "Prévoir un traiteur."
    })
}

async fn setup_sales() -> (AppState, axum::Router, TestEmployee) {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    (state, app, sales)
}

#[tokio::test]
async fn contract_creation_requires_the_requested_flag() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts"),
            Some(&sales.access_token),
            Some(json!({ "amount": 100.0, "payment_due": 100.0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "La création de contrat n'est pas demandée.");
}

#[tokio::test]
async fn contract_creation_consumes_the_requested_flag() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;

    create_contract(&app, &sales.access_token, &client_id).await;

    let client = app
        .clone()
        .oneshot(json_request(
            "GET",
            &format!("/api/clients/{client_id}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(client).await["contract_requested"], false);

    // Without a fresh request, a second contract is refused.
    let second = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts"),
            Some(&sales.access_token),
            Some(json!({ "amount": 100.0, "payment_due": 100.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_requires_a_signed_contract() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(event_payload()),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Le contrat doit être signé pour créer un événement."
    );
}

#[tokio::test]
async fn second_event_on_a_contract_is_refused() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;
    sign_contract(&app, &sales.access_token, &client_id, &contract_id).await;

    let first = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(event_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let body = body_json(first).await;
    assert!(body["support_contact"].is_null());

    let second = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(event_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let body = body_json(second).await;
    assert_eq!(body["message"], "Un événement existe déjà pour ce contrat.");
}

#[tokio::test]
async fn past_start_date_is_refused() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;
    sign_contract(&app, &sales.access_token, &client_id, &contract_id).await;

    let start = Utc::now() - Duration::days(1);
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(json!({
                "start_date": start.to_rfc3339(),
                "end_date": (start + Duration::hours(2)).to_rfc3339(),
                "attendees": 10
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["start_date"][0].as_str().is_some());
}

#[tokio::test]
async fn signed_contract_cannot_be_deleted_but_blocks_client_deletion_too() {
    let (_state, app, sales) = setup_sales().await;
    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;
    sign_contract(&app, &sales.access_token, &client_id, &contract_id).await;

    let delete_contract = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/clients/{client_id}/contracts/{contract_id}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(delete_contract.status(), StatusCode::BAD_REQUEST);
    let body = body_json(delete_contract).await;
    assert_eq!(body["message"], "Vous ne pouvez pas supprimer un contrat signé.");

    let delete_client = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/clients/{client_id}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(delete_client.status(), StatusCode::BAD_REQUEST);
    let body = body_json(delete_client).await;
    assert_eq!(
        body["message"],
        "Vous ne pouvez pas supprimer un client avec un contrat signé."
    );
}

#[tokio::test]
async fn support_contact_is_assigned_by_staff_and_gates_updates() {
    let (state, app, sales) = setup_sales().await;
    let admin = spawn_employee(&state, 2, Department::Management, "chef@epicevents.fr").await;
    let support = spawn_employee(&state, 3, Department::Support, "support@epicevents.fr").await;
    let other_support =
        spawn_employee(&state, 4, Department::Support, "autre.support@epicevents.fr").await;

    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;
    sign_contract(&app, &sales.access_token, &client_id, &contract_id).await;

    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(event_payload()),
        ))
        .await
        .unwrap();
    let event_id = body_json(created).await["id"].as_str().unwrap().to_string();
    let event_uri = format!("/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}");

    // Support cannot self-assign.
    let denied = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &event_uri,
            Some(&support.access_token),
            Some(json!({ "updated_support_contact": support.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    // Staff assigns the support contact.
    let assigned = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &event_uri,
            Some(&admin.access_token),
            Some(json!({ "updated_support_contact": support.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(assigned.status(), StatusCode::OK);
    let body = body_json(assigned).await;
    assert_eq!(body["support_contact"], support.employee_id.to_string());

    // The assigned support contact can update event fields,
    let update = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &event_uri,
            Some(&support.access_token),
            Some(json!({ "attendees": 200 })),
        ))
        .await
        .unwrap();
    assert_eq!(update.status(), StatusCode::OK);
    assert_eq!(body_json(update).await["attendees"], 200);

    // but not reassign ownership,
    let reassign = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &event_uri,
            Some(&support.access_token),
            Some(json!({ "updated_support_contact": other_support.employee_id })),
        ))
        .await
        .unwrap();
    assert_eq!(reassign.status(), StatusCode::BAD_REQUEST);
    let body = body_json(reassign).await;
    assert_eq!(body["message"], "Vous ne pouvez pas modifier le support attribué.");

    // and an unassigned support employee cannot touch the event at all.
    let foreign = app
        .oneshot(json_request(
            "PUT",
            &event_uri,
            Some(&other_support.access_token),
            Some(json!({ "attendees": 10 })),
        ))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn event_overview_scopes_support_to_their_events() {
    let (state, app, sales) = setup_sales().await;
    let admin = spawn_employee(&state, 2, Department::Management, "chef@epicevents.fr").await;
    let support = spawn_employee(&state, 3, Department::Support, "support@epicevents.fr").await;

    let client_id = create_client(&app, &sales, "452268192").await;
    request_contract(&app, &sales.access_token, &client_id).await;
    let contract_id = create_contract(&app, &sales.access_token, &client_id).await;
    sign_contract(&app, &sales.access_token, &client_id, &contract_id).await;
    let created = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/contracts/{contract_id}/event"),
            Some(&sales.access_token),
            Some(event_payload()),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);

    // Staff sees the unassigned event; the support employee does not.
    let staff_view = app
        .clone()
        .oneshot(json_request(
            "GET",
            "/api/events?null_support_contact=true",
            Some(&admin.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(staff_view.status(), StatusCode::OK);
    assert_eq!(body_json(staff_view).await.as_array().unwrap().len(), 1);

    let support_view = app
        .oneshot(json_request(
            "GET",
            "/api/events",
            Some(&support.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(support_view.status(), StatusCode::OK);
    assert!(body_json(support_view).await.as_array().unwrap().is_empty());
}
