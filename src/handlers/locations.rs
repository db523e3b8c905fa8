//! # Locations API Handlers
//!
//! Shared locations nested under their owning client or event. Removal
//! unlinks, and deletes the row only when the last reference goes; a shared
//! row cannot be edited in place.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::handlers::ApiJson;
use crate::authz::{is_admin, is_sales_contact, is_support_contact, require};
use crate::error::{ApiError, ErrorType};
use crate::handlers::types::{DetailsResponse, LocationDto, LocationInputDto};
use crate::repositories::location::{LocationOwner, RemovalOutcome};
use crate::repositories::{ClientRepository, EventRepository, LocationRepository};
use crate::server::AppState;

/// Message when a location is detached from a client.
const REMOVED_FROM_CLIENT: &str = "Le lieu a été retiré de ce client.";
/// Message when a location is detached from an event.
const REMOVED_FROM_EVENT: &str = "Le lieu a été retiré de cet événement.";

async fn authorize_client_owner(
    state: &AppState,
    requester: &CurrentUser,
    client_id: Uuid,
) -> Result<LocationOwner, ApiError> {
    let clients = ClientRepository::new(&state.db);
    let client = clients
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(requester) || is_sales_contact(requester, &client))?;
    Ok(LocationOwner::Client(client_id))
}

async fn authorize_event_owner(
    state: &AppState,
    requester: &CurrentUser,
    client_id: Uuid,
    contract_id: Uuid,
    event_id: Uuid,
) -> Result<LocationOwner, ApiError> {
    let events = EventRepository::new(&state.db);
    let event = events
        .get_event(client_id, contract_id, event_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(requester) || is_support_contact(requester, &event))?;
    Ok(LocationOwner::Event(event_id))
}

/// List the locations of a client
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/locations",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 200, description = "Location list", body = [LocationDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn list_client_locations(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<LocationDto>>, ApiError> {
    let owner = authorize_client_owner(&state, &requester, client_id).await?;

    let repo = LocationRepository::new(&state.db);
    let locations = repo.list_for_owner(owner).await.map_err(ApiError::from)?;

    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}

/// Add a location to a client
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/locations",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    request_body = LocationInputDto,
    responses(
        (status = 201, description = "Location linked, shared by address", body = LocationDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn add_client_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
    ApiJson(request): ApiJson<LocationInputDto>,
) -> Result<(StatusCode, Json<LocationDto>), ApiError> {
    let owner = authorize_client_owner(&state, &requester, client_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .add_to_owner(owner, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(location.into())))
}

/// Get a location of a client
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    responses(
        (status = 200, description = "Location detail", body = LocationDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Location not linked to this client", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn get_client_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LocationDto>, ApiError> {
    let owner = authorize_client_owner(&state, &requester, client_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .get_for_owner(owner, location_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    Ok(Json(location.into()))
}

/// Update a location of a client (sole owner only)
#[utoipa::path(
    put,
    path = "/api/clients/{client_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    request_body = LocationInputDto,
    responses(
        (status = 200, description = "Location updated", body = LocationDto),
        (status = 400, description = "Location shared with another owner", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Location not linked to this client", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn update_client_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, location_id)): Path<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<LocationInputDto>,
) -> Result<Json<LocationDto>, ApiError> {
    let owner = authorize_client_owner(&state, &requester, client_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .update_for_owner(owner, location_id, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(location.into()))
}

/// Remove a location from a client
#[utoipa::path(
    delete,
    path = "/api/clients/{client_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    responses(
        (status = 200, description = "Location unlinked; deleted if last reference", body = DetailsResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Location not linked to this client", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn remove_client_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let owner = authorize_client_owner(&state, &requester, client_id).await?;

    let repo = LocationRepository::new(&state.db);
    let outcome = repo
        .remove_from_owner(owner, location_id)
        .await
        .map_err(ApiError::from)?;

    if outcome == RemovalOutcome::Deleted {
        tracing::debug!(%location_id, "Location row deleted with its last reference");
    }

    Ok(Json(DetailsResponse {
        details: REMOVED_FROM_CLIENT.to_string(),
    }))
}

/// List the locations of an event
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID")
    ),
    responses(
        (status = 200, description = "Location list", body = [LocationDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Event not found under this contract", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn list_event_locations(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<Vec<LocationDto>>, ApiError> {
    let owner =
        authorize_event_owner(&state, &requester, client_id, contract_id, event_id).await?;

    let repo = LocationRepository::new(&state.db);
    let locations = repo.list_for_owner(owner).await.map_err(ApiError::from)?;

    Ok(Json(locations.into_iter().map(LocationDto::from).collect()))
}

/// Add a location to an event
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID")
    ),
    request_body = LocationInputDto,
    responses(
        (status = 201, description = "Location linked, shared by address", body = LocationDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Event not found under this contract", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn add_event_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id)): Path<(Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<LocationInputDto>,
) -> Result<(StatusCode, Json<LocationDto>), ApiError> {
    let owner =
        authorize_event_owner(&state, &requester, client_id, contract_id, event_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .add_to_owner(owner, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(location.into())))
}

/// Get a location of an event
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    responses(
        (status = 200, description = "Location detail", body = LocationDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Location not linked to this event", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn get_event_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id, location_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<Json<LocationDto>, ApiError> {
    let owner =
        authorize_event_owner(&state, &requester, client_id, contract_id, event_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .get_for_owner(owner, location_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    Ok(Json(location.into()))
}

/// Update a location of an event (sole owner only)
#[utoipa::path(
    put,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    request_body = LocationInputDto,
    responses(
        (status = 200, description = "Location updated", body = LocationDto),
        (status = 400, description = "Location shared with another owner", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Location not linked to this event", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn update_event_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id, location_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
    ApiJson(request): ApiJson<LocationInputDto>,
) -> Result<Json<LocationDto>, ApiError> {
    let owner =
        authorize_event_owner(&state, &requester, client_id, contract_id, event_id).await?;

    let repo = LocationRepository::new(&state.db);
    let location = repo
        .update_for_owner(owner, location_id, request.into())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(location.into()))
}

/// Remove a location from an event
#[utoipa::path(
    delete,
    path = "/api/clients/{client_id}/contracts/{contract_id}/event/{event_id}/locations/{location_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID"),
        ("event_id" = Uuid, Path, description = "Event UUID"),
        ("location_id" = Uuid, Path, description = "Location UUID")
    ),
    responses(
        (status = 200, description = "Location unlinked; deleted if last reference", body = DetailsResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned support contact", body = ApiError),
        (status = 404, description = "Location not linked to this event", body = ApiError)
    ),
    tag = "locations"
)]
pub async fn remove_event_location(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id, event_id, location_id)): Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<Json<DetailsResponse>, ApiError> {
    let owner =
        authorize_event_owner(&state, &requester, client_id, contract_id, event_id).await?;

    let repo = LocationRepository::new(&state.db);
    let outcome = repo
        .remove_from_owner(owner, location_id)
        .await
        .map_err(ApiError::from)?;

    if outcome == RemovalOutcome::Deleted {
        tracing::debug!(%location_id, "Location row deleted with its last reference");
    }

    Ok(Json(DetailsResponse {
        details: REMOVED_FROM_EVENT.to_string(),
    }))
}
