//! # Clients API Handlers
//!
//! Client CRUD. Creation is reserved to sales employees, who become the
//! assigned contact; detail access requires staff or the assigned contact;
//! sales-contact reassignment goes through the privileged write-only field.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::handlers::ApiJson;
use crate::authz::{Action, can, is_admin, is_sales_contact, require};
use crate::error::{ApiError, ErrorType, validation_error};
use crate::handlers::types::{ClientDto, LocationInputDto};
use crate::repositories::ClientRepository;
use crate::repositories::client::{
    CreateClientRequest, SALES_CONTACT_READONLY, UpdateClientRequest,
};
use crate::server::AppState;

/// Request payload for creating a client
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClientDto {
    #[schema(example = "Société Horizon")]
    pub company_name: String,
    #[schema(example = "452268192")]
    pub siren: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub locations: Vec<LocationInputDto>,
}

/// Request payload for updating a client
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClientDto {
    pub company_name: Option<String>,
    pub siren: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contract_requested: Option<bool>,
    /// Employee UUID; staff only
    pub updated_sales_contact: Option<Uuid>,
}

/// List all clients
#[utoipa::path(
    get,
    path = "/api/clients",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Client list", body = [ClientDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Department cannot view clients", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn list_clients(
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<Vec<ClientDto>>, ApiError> {
    require(is_admin(&requester) || can(&requester, Action::ViewClient))?;

    let repo = ClientRepository::new(&state.db);
    let clients = repo.list_clients().await.map_err(ApiError::from)?;

    Ok(Json(clients.into_iter().map(ClientDto::from).collect()))
}

/// Create a client assigned to the requesting sales employee
#[utoipa::path(
    post,
    path = "/api/clients",
    security(("bearer_auth" = [])),
    request_body = CreateClientDto,
    responses(
        (status = 201, description = "Client created", body = ClientDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not a sales employee", body = ApiError),
        (status = 409, description = "SIREN already registered", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn create_client(
    State(state): State<AppState>,
    requester: CurrentUser,
    ApiJson(request): ApiJson<CreateClientDto>,
) -> Result<(StatusCode, Json<ClientDto>), ApiError> {
    require(can(&requester, Action::AddClient))?;

    let sales_contact_id = requester.employee_id().ok_or_else(|| {
        validation_error(
            "Saisie invalide",
            serde_json::json!({ "sales_contact": ["Aucun profil employé n'est associé à ce compte."] }),
        )
    })?;

    let repo = ClientRepository::new(&state.db);
    let client = repo
        .create_client(CreateClientRequest {
            company_name: request.company_name,
            siren: request.siren,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            phone_number: request.phone_number,
            sales_contact_id,
            locations: request.locations.into_iter().map(Into::into).collect(),
        })
        .await
        .map_err(ApiError::from)?;

    tracing::info!(client_id = %client.id, "Client created");

    Ok((StatusCode::CREATED, Json(client.into())))
}

/// Get a client by id
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 200, description = "Client detail", body = ClientDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn get_client(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientDto>, ApiError> {
    let repo = ClientRepository::new(&state.db);
    let client = repo
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(&requester) || is_sales_contact(&requester, &client))?;

    Ok(Json(client.into()))
}

/// Update a client
#[utoipa::path(
    put,
    path = "/api/clients/{client_id}",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    request_body = UpdateClientDto,
    responses(
        (status = 200, description = "Client updated", body = ClientDto),
        (status = 400, description = "Validation or reassignment failure", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn update_client(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateClientDto>,
) -> Result<Json<ClientDto>, ApiError> {
    let repo = ClientRepository::new(&state.db);
    let client = repo
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(&requester) || is_sales_contact(&requester, &client))?;

    // The owning field is read-only for everyone; only staff may go through
    // the write-only reassignment field.
    if request.updated_sales_contact.is_some() && !is_admin(&requester) {
        return Err(validation_error(
            SALES_CONTACT_READONLY,
            serde_json::json!({ "updated_sales_contact": [SALES_CONTACT_READONLY] }),
        ));
    }

    let client = repo
        .update_client(
            client_id,
            UpdateClientRequest {
                company_name: request.company_name,
                siren: request.siren,
                first_name: request.first_name,
                last_name: request.last_name,
                email: request.email,
                phone_number: request.phone_number,
                contract_requested: request.contract_requested,
                updated_sales_contact: request.updated_sales_contact,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(client.into()))
}

/// Delete a client without signed contracts
#[utoipa::path(
    delete,
    path = "/api/clients/{client_id}",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    responses(
        (status = 204, description = "Client deleted; orphaned locations pruned"),
        (status = 400, description = "A signed contract blocks deletion", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "clients"
)]
pub async fn delete_client(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ClientRepository::new(&state.db);
    let client = repo
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(&requester) || is_sales_contact(&requester, &client))?;

    repo.delete_client(client_id).await.map_err(ApiError::from)?;

    tracing::info!(%client_id, "Client deleted");

    Ok(StatusCode::NO_CONTENT)
}
