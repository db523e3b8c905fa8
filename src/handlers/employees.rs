//! # Employees API Handlers
//!
//! Staff-only management of employees and their user accounts.

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
use crate::authz::{is_admin, require};
use crate::error::{ApiError, ErrorType, validation_error};
use crate::handlers::types::EmployeeDto;
use crate::models::employee::Department;
use crate::repositories::EmployeeRepository;
use crate::repositories::employee::{CreateEmployeeRequest, UpdateEmployeeRequest};
use crate::server::AppState;
use crate::validation::{self, FieldErrors, PASSWORD_MISMATCH_MESSAGE, REQUIRED_MESSAGE};

/// Nested user account fields on employee creation
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserDto {
    #[schema(example = "jean.dupont@epicevents.fr")]
    pub email: String,
    pub password: String,
    pub password2: String,
}

/// Request payload for creating an employee
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeDto {
    pub employee_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub user: CreateUserDto,
}

/// Nested user account fields on employee update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserDto {
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Request payload for updating an employee
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeDto {
    pub employee_number: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<Department>,
    pub user: Option<UpdateUserDto>,
}

fn validate_create(request: &CreateEmployeeDto) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    if request.employee_number <= 0 {
        errors.push("employee_number", "Un nombre entier valide est requis.");
    }
    errors.check("first_name", validation::validate_alpha(&request.first_name));
    errors.check("last_name", validation::validate_alpha(&request.last_name));
    errors.check("email", validation::validate_email(&request.user.email));
    if request.user.password.len() < 8 || request.user.password.len() > 128 {
        errors.push(
            "password",
            "Le mot de passe doit comporter entre 8 et 128 caractères.",
        );
    }
    if request.user.password != request.user.password2 {
        errors.push("password", PASSWORD_MISMATCH_MESSAGE);
    }
    errors
        .into_result()
        .map_err(|details| validation_error("Saisie invalide", details))
}

fn validate_update(request: &UpdateEmployeeDto) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    if let Some(employee_number) = request.employee_number
        && employee_number <= 0
    {
        errors.push("employee_number", "Un nombre entier valide est requis.");
    }
    if let Some(ref first_name) = request.first_name {
        errors.check("first_name", validation::validate_alpha(first_name));
    }
    if let Some(ref last_name) = request.last_name {
        errors.check("last_name", validation::validate_alpha(last_name));
    }
    if let Some(ref user) = request.user {
        if let Some(ref email) = user.email {
            if email.is_empty() {
                errors.push("email", REQUIRED_MESSAGE);
            } else {
                errors.check("email", validation::validate_email(email));
            }
        }
    }
    errors
        .into_result()
        .map_err(|details| validation_error("Saisie invalide", details))
}

/// List all employees
#[utoipa::path(
    get,
    path = "/api/employees",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Employee list", body = [EmployeeDto]),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not staff", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<Json<Vec<EmployeeDto>>, ApiError> {
    require(is_admin(&requester))?;

    let repo = EmployeeRepository::new(&state.db);
    let employees = repo.list_employees().await.map_err(ApiError::from)?;

    Ok(Json(
        employees
            .into_iter()
            .map(|(employee, user)| EmployeeDto::from_models(employee, user))
            .collect(),
    ))
}

/// Create an employee with their user account
#[utoipa::path(
    post,
    path = "/api/employees",
    security(("bearer_auth" = [])),
    request_body = CreateEmployeeDto,
    responses(
        (status = 201, description = "Employee created", body = EmployeeDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not staff", body = ApiError),
        (status = 409, description = "Email or employee number already attributed", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    requester: CurrentUser,
    ApiJson(request): ApiJson<CreateEmployeeDto>,
) -> Result<(StatusCode, Json<EmployeeDto>), ApiError> {
    require(is_admin(&requester))?;
    validate_create(&request)?;

    let repo = EmployeeRepository::new(&state.db);
    let (employee, user) = repo
        .create_employee(CreateEmployeeRequest {
            employee_number: request.employee_number,
            first_name: request.first_name,
            last_name: request.last_name,
            department: request.department,
            email: request.user.email,
            password: request.user.password,
        })
        .await
        .map_err(ApiError::from)?;

    tracing::info!(employee_id = %employee.id, department = ?employee.department, "Employee created");

    Ok((
        StatusCode::CREATED,
        Json(EmployeeDto::from_models(employee, user)),
    ))
}

/// Get an employee by id
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 200, description = "Employee detail", body = EmployeeDto),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not staff", body = ApiError),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> Result<Json<EmployeeDto>, ApiError> {
    require(is_admin(&requester))?;

    let repo = EmployeeRepository::new(&state.db);
    let (employee, user) = repo
        .get_employee(employee_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::from(ErrorType::NotFound))?;

    Ok(Json(EmployeeDto::from_models(employee, user)))
}

/// Update an employee and the nested user account
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee UUID")),
    request_body = UpdateEmployeeDto,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not staff", body = ApiError),
        (status = 404, description = "Employee not found", body = ApiError),
        (status = 409, description = "Email already attributed", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(employee_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateEmployeeDto>,
) -> Result<Json<EmployeeDto>, ApiError> {
    require(is_admin(&requester))?;
    validate_update(&request)?;

    let (email, is_active) = request
        .user
        .map(|user| (user.email, user.is_active))
        .unwrap_or((None, None));

    let repo = EmployeeRepository::new(&state.db);
    let (employee, user) = repo
        .update_employee(
            employee_id,
            UpdateEmployeeRequest {
                employee_number: request.employee_number,
                first_name: request.first_name,
                last_name: request.last_name,
                department: request.department,
                email,
                is_active,
            },
        )
        .await
        .map_err(ApiError::from)?;

    Ok(Json(EmployeeDto::from_models(employee, user)))
}

/// Delete an employee and their user account
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee UUID")),
    responses(
        (status = 204, description = "Employee and linked user deleted"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError),
        (status = 403, description = "Requester is not staff", body = ApiError),
        (status = 404, description = "Employee not found", body = ApiError)
    ),
    tag = "employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    requester: CurrentUser,
    Path(employee_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require(is_admin(&requester))?;

    let repo = EmployeeRepository::new(&state.db);
    repo.delete_employee(employee_id)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(%employee_id, "Employee deleted with linked user");

    Ok(StatusCode::NO_CONTENT)
}
