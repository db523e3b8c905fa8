//! # Server Configuration
//!
//! This module contains the router assembly and server setup for the
//! Epic Events CRM API.

use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{self, TraceContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Attach a correlation ID to the request and echo it as `x-trace-id`.
async fn trace_middleware(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let context = TraceContext {
        trace_id: trace_id.clone(),
    };

    let mut request = request;
    request.extensions_mut().insert(context.clone());

    let mut response = telemetry::with_trace_context(context, next.run(request)).await;
    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("x-trace-id", value);
    }
    response
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/logout", post(handlers::auth::logout))
        .route(
            "/api/employees",
            get(handlers::employees::list_employees).post(handlers::employees::create_employee),
        )
        .route(
            "/api/employees/{employee_id}",
            get(handlers::employees::get_employee)
                .put(handlers::employees::update_employee)
                .delete(handlers::employees::delete_employee),
        )
        .route(
            "/api/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/api/clients/{client_id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/clients/{client_id}/locations",
            get(handlers::locations::list_client_locations)
                .post(handlers::locations::add_client_location),
        )
        .route(
            "/api/clients/{client_id}/locations/{location_id}",
            get(handlers::locations::get_client_location)
                .put(handlers::locations::update_client_location)
                .delete(handlers::locations::remove_client_location),
        )
        .route(
            "/api/clients/{client_id}/contracts",
            get(handlers::contracts::list_contracts).post(handlers::contracts::create_contract),
        )
        .route(
            "/api/clients/{client_id}/contracts/{contract_id}",
            get(handlers::contracts::get_contract)
                .put(handlers::contracts::update_contract)
                .delete(handlers::contracts::delete_contract),
        )
        .route(
            "/api/clients/{client_id}/contracts/{contract_id}/event",
            post(handlers::events::create_event),
        )
        .route(
            "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}",
            get(handlers::events::get_event).put(handlers::events::update_event),
        )
        .route(
            "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations",
            get(handlers::locations::list_event_locations)
                .post(handlers::locations::add_event_location),
        )
        .route(
            "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations/{location_id}",
            get(handlers::locations::get_event_location)
                .put(handlers::locations::update_event_location)
                .delete(handlers::locations::remove_event_location),
        )
        .route("/api/events", get(handlers::events::list_events))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/login", post(handlers::auth::login))
        .route("/api/login/refresh", post(handlers::auth::refresh))
        .merge(protected)
        .layer(middleware::from_fn(trace_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the configured bind address before moving the config
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds an [`AppState`] without the full startup sequence (used by tests).
pub fn create_test_app_state(config: AppConfig, db: DatabaseConnection) -> AppState {
    AppState {
        config: Arc::new(config),
        db,
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::auth::login,
        crate::handlers::auth::refresh,
        crate::handlers::auth::logout,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,
        crate::handlers::clients::list_clients,
        crate::handlers::clients::create_client,
        crate::handlers::clients::get_client,
        crate::handlers::clients::update_client,
        crate::handlers::clients::delete_client,
        crate::handlers::contracts::list_contracts,
        crate::handlers::contracts::create_contract,
        crate::handlers::contracts::get_contract,
        crate::handlers::contracts::update_contract,
        crate::handlers::contracts::delete_contract,
        crate::handlers::events::list_events,
        crate::handlers::events::create_event,
        crate::handlers::events::get_event,
        crate::handlers::events::update_event,
        crate::handlers::locations::list_client_locations,
        crate::handlers::locations::add_client_location,
        crate::handlers::locations::get_client_location,
        crate::handlers::locations::update_client_location,
        crate::handlers::locations::remove_client_location,
        crate::handlers::locations::list_event_locations,
        crate::handlers::locations::add_event_location,
        crate::handlers::locations::get_event_location,
        crate::handlers::locations::update_event_location,
        crate::handlers::locations::remove_event_location,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::error::ApiError,
            crate::handlers::types::UserDto,
            crate::handlers::types::EmployeeDto,
            crate::handlers::types::ClientDto,
            crate::handlers::types::ContractDto,
            crate::handlers::types::EventDto,
            crate::handlers::types::LocationDto,
            crate::handlers::types::LocationInputDto,
            crate::handlers::types::DetailsResponse,
            crate::handlers::auth::LoginRequestDto,
            crate::handlers::auth::TokenPairDto,
            crate::handlers::auth::RefreshRequestDto,
            crate::handlers::auth::AccessTokenDto,
            crate::handlers::employees::CreateUserDto,
            crate::handlers::employees::CreateEmployeeDto,
            crate::handlers::employees::UpdateUserDto,
            crate::handlers::employees::UpdateEmployeeDto,
            crate::handlers::clients::CreateClientDto,
            crate::handlers::clients::UpdateClientDto,
            crate::handlers::contracts::CreateContractDto,
            crate::handlers::contracts::UpdateContractDto,
            crate::handlers::events::CreateEventDto,
            crate::handlers::events::UpdateEventDto,
        )
    ),
    info(
        title = "Epic Events CRM API",
        description = "REST API for the Epic Events CRM: employees, clients, contracts, events, and shared locations",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
