//! # Contracts API Handlers
//!
//! Contracts nested under their client. Creation consumes the client's
//! contract_requested flag; signed contracts cannot be deleted.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::handlers::ApiJson;
use crate::authz::{is_admin, is_sales_contact, require};
use crate::error::{ApiError, ErrorType};
use crate::handlers::types::ContractDto;
use crate::models::client;
use crate::repositories::contract::{
    ContractFilter, CreateContractRequest, UpdateContractRequest,
};
use crate::repositories::{ClientRepository, ContractRepository};
use crate::server::AppState;

/// Request payload for creating a contract
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContractDto {
    pub contract_description: Option<String>,
    #[schema(example = 1452.25)]
    pub amount: f64,
    #[schema(example = 1452.25)]
    pub payment_due: f64,
}

/// Request payload for updating a contract
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContractDto {
    pub contract_description: Option<String>,
    pub amount: Option<f64>,
    pub payment_due: Option<f64>,
    pub is_signed: Option<bool>,
}

/// Query filters for the contract list
#[derive(Debug, Deserialize, IntoParams)]
pub struct ContractListQuery {
    /// Filter on the signature flag
    pub is_signed: Option<bool>,
    /// Keep contracts with an outstanding balance above this value
    pub min_payment_due: Option<f64>,
}

async fn load_authorized_client(
    state: &AppState,
    requester: &CurrentUser,
    client_id: Uuid,
) -> Result<client::Model, ApiError> {
    let clients = ClientRepository::new(&state.db);
    let client = clients
        .get_client(client_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    require(is_admin(requester) || is_sales_contact(requester, &client))?;
    Ok(client)
}

/// List the contracts of a client
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/contracts",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ContractListQuery
    ),
    responses(
        (status = 200, description = "Contract list, signed first", body = [ContractDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "contracts"
)]
pub async fn list_contracts(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
    Query(query): Query<ContractListQuery>,
) -> Result<Json<Vec<ContractDto>>, ApiError> {
    load_authorized_client(&state, &requester, client_id).await?;

    let repo = ContractRepository::new(&state.db);
    let contracts = repo
        .list_for_client(
            client_id,
            ContractFilter {
                is_signed: query.is_signed,
                min_payment_due: query.min_payment_due,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(contracts.into_iter().map(ContractDto::from).collect()))
}

/// Create a contract for a client that requested one
#[utoipa::path(
    post,
    path = "/api/clients/{client_id}/contracts",
    security(("bearer_auth" = [])),
    params(("client_id" = Uuid, Path, description = "Client UUID")),
    request_body = CreateContractDto,
    responses(
        (status = 201, description = "Contract created; request flag consumed", body = ContractDto),
        (status = 400, description = "Contract creation not requested", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client not found", body = ApiError)
    ),
    tag = "contracts"
)]
pub async fn create_contract(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(client_id): Path<Uuid>,
    ApiJson(request): ApiJson<CreateContractDto>,
) -> Result<(StatusCode, Json<ContractDto>), ApiError> {
    load_authorized_client(&state, &requester, client_id).await?;

    let repo = ContractRepository::new(&state.db);
    let contract = repo
        .create_contract(
            client_id,
            CreateContractRequest {
                description: request.contract_description,
                amount: request.amount,
                payment_due: request.payment_due,
            },
        )
        .await
        .map_err(ApiError::from)?;

    tracing::info!(contract_id = %contract.id, %client_id, "Contract created");

    Ok((StatusCode::CREATED, Json(contract.into())))
}

/// Get a contract of a client
#[utoipa::path(
    get,
    path = "/api/clients/{client_id}/contracts/{contract_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID")
    ),
    responses(
        (status = 200, description = "Contract detail", body = ContractDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client or contract not found", body = ApiError)
    ),
    tag = "contracts"
)]
pub async fn get_contract(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ContractDto>, ApiError> {
    load_authorized_client(&state, &requester, client_id).await?;

    let repo = ContractRepository::new(&state.db);
    let contract = repo
        .get_contract(client_id, contract_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    Ok(Json(contract.into()))
}

/// Update a contract's terms or signature
#[utoipa::path(
    put,
    path = "/api/clients/{client_id}/contracts/{contract_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID")
    ),
    request_body = UpdateContractDto,
    responses(
        (status = 200, description = "Contract updated", body = ContractDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client or contract not found", body = ApiError)
    ),
    tag = "contracts"
)]
pub async fn update_contract(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id)): Path<(Uuid, Uuid)>,
    ApiJson(request): ApiJson<UpdateContractDto>,
) -> Result<Json<ContractDto>, ApiError> {
    load_authorized_client(&state, &requester, client_id).await?;

    let repo = ContractRepository::new(&state.db);
    let contract = repo
        .update_contract(
            client_id,
            contract_id,
            UpdateContractRequest {
                description: request.contract_description,
                amount: request.amount,
                payment_due: request.payment_due,
                is_signed: request.is_signed,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(contract.into()))
}

/// Delete an unsigned contract
#[utoipa::path(
    delete,
    path = "/api/clients/{client_id}/contracts/{contract_id}",
    security(("bearer_auth" = [])),
    params(
        ("client_id" = Uuid, Path, description = "Client UUID"),
        ("contract_id" = Uuid, Path, description = "Contract UUID")
    ),
    responses(
        (status = 204, description = "Contract deleted"),
        (status = 400, description = "A signed contract cannot be deleted", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Not staff nor the assigned sales contact", body = ApiError),
        (status = 404, description = "Client or contract not found", body = ApiError)
    ),
    tag = "contracts"
)]
pub async fn delete_contract(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path((client_id, contract_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    load_authorized_client(&state, &requester, client_id).await?;

    let repo = ContractRepository::new(&state.db);
    repo.delete_contract(client_id, contract_id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
