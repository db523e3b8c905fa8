//! # Events API Handlers
//!
//! One event per signed contract, nested under the contract; a top-level
//! overview supports the support-contact filters.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::handlers::ApiJson;
use crate::authz::{Action, can, is_admin, is_sales_contact, is_support_contact, require};
use crate::error::{ApiError, ErrorType, validation_error};
use crate::handlers::types::{EventDto, LocationInputDto};
use crate::models::employee::Department;
use crate::repositories::event::{
    CreateEventRequest, EventFilter, SUPPORT_CONTACT_READONLY, UpdateEventRequest,
};
use crate::repositories::{ClientRepository, EventRepository};
use crate::server::AppState;

/// Request payload for creating an event
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventDto {
    pub event_name: Option<String>,
    /// ISO 8601 start timestamp; must not be in the past
    #[schema(example = "2026-12-15T12:00:00+01:00")]
    pub start_date: DateTime<FixedOffset>,
    /// ISO 8601 end timestamp; must not precede start_date
    #[schema(example = "2026-12-15T18:00:00+01:00")]
    pub end_date: DateTime<FixedOffset>,
    pub attendees: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub locations: Vec<LocationInputDto>,
}

/// Request payload for updating an event
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEventDto {
    pub event_name: Option<String>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
    pub attendees: Option<i32>,
    pub notes: Option<String>,
    /// Employee UUID; staff only
    pub updated_support_contact: Option<Uuid>,
}

/// Query filters for the event overview
#[derive(Debug, Deserialize, IntoParams)]
pub struct EventListQuery {
    /// `start_date` sorts by upcoming dates, hiding past events
    pub order_by: Option<String>,
    /// Keep only events without (true) or with (false) a support contact
    pub null_support_contact: Option<bool>,
    pub support_contact_first_name: Option<String>,
    pub support_contact_last_name: Option<String>,
}

/// Event overview across all contracts
#[utoipa::path(
    get,
    path = "/api/events",
    security(("bearer_auth" = [])),
    params(EventListQuery),
    responses(
        (status = 200, description = "Event list", body = [EventDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Department cannot view events", body = ApiError)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    requester: CurrentUser,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventDto>>, ApiError> {
    // Support employees only see their own assignments; the capability
    // matrix grants the full overview to staff and sales.
    let support_scope = match requester.department() {
        Some(Department::Support) if !is_admin(&requester) => requester.employee_id(),
        _ => {
            require(is_admin(&requester) || can(&requester, Action::ViewEvent))?;
            None
        }
    };

    let repo = EventRepository::new(&state.db);
    let events = repo
        .list_events(EventFilter {
            upcoming_only: query.order_by.as_deref() == Some("start_date"),
            null_support_contact: query.null_support_contact,
            support_contact_id: support_scope,
            support_contact_first_name: query.support_contact_first_name,
            support_contact_last_name: query.support_contact_last_name,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

/// Create the event of a signed contract
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID")
    ),
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created, without support contact", body = EventDto),
        (status = 400, description = "Contract unsigned, event already exists, or invalid dates", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client or contract not found", body = ApiError)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id)): Path<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<CreateEventDto>,
) -> Result<(StatusCode, Json<EventDto>), ApiError> {
    let clients = ClientRepository::new(&state.db);
    let client = clients
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(&requester) || is_sales_contact(&requester, &client))?;

    let repo = EventRepository::new(&state.db);
    let event = repo
        .create_event(
            client_id,
            contract_id,
            CreateEventRequest {
                name: request.event_name,
                start_date: request.start_date,
                end_date: request.end_date,
                attendees: request.attendees,
                notes: request.notes,
                locations: request.locations.into_iter().map(Into::into).collect(),
            },
        )
        .await
        .map_err(ApiError::from)?;

    tracing::info!(event_id = %event.id, %contract_id, "Event created");

    Ok((StatusCode::CREATED, Json(event.into())))
}

/// Get the event of a contract
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID")
    ),
    responses(
        (status = 200, description = "Event detail", body = EventDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff, sales contact, nor support contact", body = ApiError),
        (status = 404, description = "Event not found under this contract", body = ApiError)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<EventDto>, ApiError> {
    let repo = EventRepository::new(&state.db);
    let event = repo
        .get_event(client_id, contract_id, event_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    let clients = ClientRepository::new(&state.db);
    let client = clients
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(
        is_admin(&requester)
            || is_sales_contact(&requester, &client)
            || is_support_contact(&requester, &event),
    )?;

    Ok(Json(event.into()))
}

/// Update the event of a contract
#[utoipa::path(
    put,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID")
    ),
    request_body = UpdateEventDto,
    responses(
        (status = 200, description = "Event updated", body = EventDto),
        (status = 400, description = "Validation or reassignment failure", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Event not found under this contract", body = ApiError)
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateEventDto>,
) -> Result<Json<EventDto>, ApiError> {
    let repo = EventRepository::new(&state.db);
    let event = repo
        .get_event(client_id, contract_id, event_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(&requester) || is_support_contact(&requester, &event))?;

    // The owning field is read-only; only staff may reassign support.
    if request.updated_support_contact.is_some() && !is_admin(&requester) {
        return Err(validation_error(
            SUPPORT_CONTACT_READONLY,
            serde_json::json!({ "updated_support_contact": [SUPPORT_CONTACT_READONLY] }),
        ));
    }

    let event = repo
        .update_event(
            client_id,
            contract_id,
            event_id,
            UpdateEventRequest {
                name: request.event_name,
                start_date: request.start_date,
                end_date: request.end_date,
                attendees: request.attendees,
                notes: request.notes,
                updated_support_contact: request.updated_support_contact,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(event.into()))
}
