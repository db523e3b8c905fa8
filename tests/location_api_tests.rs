//! Integration tests for shared-location reference counting through the API.

mod common;

use axum::http::StatusCode;
use common::{TestEmployee, body_json, json_request, setup_test_app, spawn_employee};
use epicevents::models::Location;
use epicevents::models::employee::Department;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use tower::ServiceExt;

fn location_payload(number: i32, street: &str) -> serde_json::Value {
    json!({
        "street_number": number,
        "street_name": street,
        "city": "Paris",
        "zip_code": "75001",
        "country": "France"
    })
}

async fn create_client(app: &axum::Router, sales: &TestEmployee, siren: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/clients",
            Some(&sales.access_token),
            Some(json!({ "company_name": "Société Horizon", "siren": siren })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

async fn add_location(
    app: &axum::Router,
    token: &str,
    client_id: &str,
    payload: serde_json::Value,
) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/locations"),
            Some(token),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn same_address_is_shared_between_clients() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let client_a = create_client(&app, &sales, "452268192").await;
    let client_b = create_client(&app, &sales, "123456789").await;

    let first = add_location(&app, &sales.access_token, &client_a, location_payload(5, "Rue de Rivoli")).await;
    let second = add_location(&app, &sales.access_token, &client_b, location_payload(5, "Rue de Rivoli")).await;

    assert_eq!(first, second);
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn removing_shared_location_keeps_the_row() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let client_a = create_client(&app, &sales, "452268192").await;
    let client_b = create_client(&app, &sales, "123456789").await;
    let location_id =
        add_location(&app, &sales.access_token, &client_a, location_payload(9, "Rue du Bac")).await;
    add_location(&app, &sales.access_token, &client_b, location_payload(9, "Rue du Bac")).await;

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/clients/{client_a}/locations/{location_id}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["details"], "Le lieu a été retiré de ce client.");
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn removing_last_reference_deletes_the_row() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let client_id = create_client(&app, &sales, "452268192").await;
    let location_id =
        add_location(&app, &sales.access_token, &client_id, location_payload(3, "Rue Oberkampf")).await;

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/clients/{client_id}/locations/{location_id}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn updating_a_shared_location_is_refused() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let client_a = create_client(&app, &sales, "452268192").await;
    let client_b = create_client(&app, &sales, "123456789").await;
    let location_id =
        add_location(&app, &sales.access_token, &client_a, location_payload(2, "Rue Cler")).await;
    add_location(&app, &sales.access_token, &client_b, location_payload(2, "Rue Cler")).await;

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/clients/{client_a}/locations/{location_id}"),
            Some(&sales.access_token),
            Some(location_payload(8, "Rue Cler")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Ce lieu est utilisé par un autre modèle. Vous devez le supprimer de ce modèle."
    );
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 2);
}

#[tokio::test]
async fn deleting_a_client_prunes_its_exclusive_locations() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;

    let doomed = create_client(&app, &sales, "452268192").await;
    let survivor = create_client(&app, &sales, "123456789").await;

    add_location(&app, &sales.access_token, &doomed, location_payload(1, "Rue Partagée")).await;
    add_location(&app, &sales.access_token, &survivor, location_payload(1, "Rue Partagée")).await;
    add_location(&app, &sales.access_token, &doomed, location_payload(2, "Rue Privée")).await;
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 2);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/clients/{doomed}"),
            Some(&sales.access_token),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(Location::find().count(&state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn invalid_address_fields_are_reported_together() {
    let (state, app) = setup_test_app().await;
    let sales = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    let client_id = create_client(&app, &sales, "452268192").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/locations"),
            Some(&sales.access_token),
            Some(json!({
                "street_number": 5,
                "street_name": "Rue <interdite>",
                "city": "Paris3",
                "zip_code": "750",
                "country": "France"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["details"]["street_name"][0].as_str().is_some());
    assert!(body["details"]["city"][0].as_str().is_some());
    assert!(body["details"]["zip_code"][0].as_str().is_some());
}

#[tokio::test]
async fn unrelated_sales_employee_cannot_manage_locations() {
    let (state, app) = setup_test_app().await;
    let owner = spawn_employee(&state, 1, Department::Sales, "vente@epicevents.fr").await;
    let other = spawn_employee(&state, 2, Department::Sales, "autre@epicevents.fr").await;

    let client_id = create_client(&app, &owner, "452268192").await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/clients/{client_id}/locations"),
            Some(&other.access_token),
            Some(location_payload(4, "Rue Mouffetard")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
