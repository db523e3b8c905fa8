//! Shared response DTOs for the API handlers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::employee::Department;
use crate::models::{client, contract, employee, event, location, user};

/// User account payload nested in employee responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: Uuid,
    #[schema(example = "jean.dupont@epicevents.fr")]
    pub email: String,
    pub is_active: bool,
    pub is_staff: bool,
    /// Account creation timestamp (ISO 8601)
    pub date_joined: String,
}

impl From<user::Model> for UserDto {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_active: user.is_active,
            is_staff: user.is_staff,
            date_joined: user.date_joined.to_rfc3339(),
        }
    }
}

/// Employee payload with the nested user account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmployeeDto {
    pub id: Uuid,
    pub employee_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub user: UserDto,
    pub created_at: String,
    pub updated_at: String,
}

impl EmployeeDto {
    pub fn from_models(employee: employee::Model, user: user::Model) -> Self {
        Self {
            id: employee.id,
            employee_number: employee.employee_number,
            first_name: employee.first_name,
            last_name: employee.last_name,
            department: employee.department,
            user: user.into(),
            created_at: employee.created_at.to_rfc3339(),
            updated_at: employee.updated_at.to_rfc3339(),
        }
    }
}

/// Client payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientDto {
    pub id: Uuid,
    #[schema(example = "Société Horizon")]
    pub company_name: String,
    #[schema(example = "452268192")]
    pub siren: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contract_requested: bool,
    /// Assigned sales employee (read-only; reassign via updated_sales_contact)
    pub sales_contact: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<client::Model> for ClientDto {
    fn from(client: client::Model) -> Self {
        Self {
            id: client.id,
            company_name: client.company_name,
            siren: client.siren,
            first_name: client.first_name,
            last_name: client.last_name,
            email: client.email,
            phone_number: client.phone_number,
            contract_requested: client.contract_requested,
            sales_contact: client.sales_contact_id,
            created_at: client.created_at.to_rfc3339(),
            updated_at: client.updated_at.to_rfc3339(),
        }
    }
}

/// Contract payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractDto {
    pub id: Uuid,
    pub contract_description: Option<String>,
    pub amount: f64,
    pub payment_due: f64,
    pub is_signed: bool,
    pub client: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<contract::Model> for ContractDto {
    fn from(contract: contract::Model) -> Self {
        Self {
            id: contract.id,
            contract_description: contract.description,
            amount: contract.amount,
            payment_due: contract.payment_due,
            is_signed: contract.is_signed,
            client: contract.client_id,
            created_at: contract.created_at.to_rfc3339(),
            updated_at: contract.updated_at.to_rfc3339(),
        }
    }
}

/// Event payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: Uuid,
    pub event_name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub attendees: i32,
    pub notes: Option<String>,
    pub contract: Uuid,
    /// Assigned support employee (read-only; reassign via updated_support_contact)
    pub support_contact: Option<Uuid>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<event::Model> for EventDto {
    fn from(event: event::Model) -> Self {
        Self {
            id: event.id,
            event_name: event.name,
            start_date: event.start_date.to_rfc3339(),
            end_date: event.end_date.to_rfc3339(),
            attendees: event.attendees,
            notes: event.notes,
            contract: event.contract_id,
            support_contact: event.support_contact_id,
            created_at: event.created_at.to_rfc3339(),
            updated_at: event.updated_at.to_rfc3339(),
        }
    }
}

/// Location payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LocationDto {
    pub id: Uuid,
    pub street_number: i32,
    pub street_name: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl From<location::Model> for LocationDto {
    fn from(location: location::Model) -> Self {
        Self {
            id: location.id,
            street_number: location.street_number,
            street_name: location.street_name,
            city: location.city,
            zip_code: location.zip_code,
            country: location.country,
        }
    }
}

/// Address fields accepted when adding or updating a location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LocationInputDto {
    pub street_number: i32,
    #[schema(example = "Rue de Rivoli")]
    pub street_name: String,
    #[schema(example = "Paris")]
    pub city: String,
    #[schema(example = "75001")]
    pub zip_code: String,
    #[schema(example = "France")]
    pub country: String,
}

impl From<LocationInputDto> for crate::repositories::location::LocationInput {
    fn from(dto: LocationInputDto) -> Self {
        Self {
            street_number: dto.street_number,
            street_name: dto.street_name,
            city: dto.city,
            zip_code: dto.zip_code,
            country: dto.country,
        }
    }
}

/// Fixed-format informational response (`details` key, French message)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailsResponse {
    pub details: String,
}
