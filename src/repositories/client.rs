//! # Client Repository
//!
//! Client lifecycle: creation under a SALES-department contact, ownership
//! reassignment, and deletion guarded by the signed-contract rule with
//! explicit pruning of orphaned locations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::employee::Department;
use crate::models::{Client, Contract, Employee, Event, client, contract, event};
use crate::repositories::location::{self, LocationInput, LocationOwner};
use crate::validation::{self, FieldErrors};

/// Message when deletion is blocked by a signed contract.
pub const CLIENT_HAS_SIGNED_CONTRACT: &str =
    "Vous ne pouvez pas supprimer un client avec un contrat signé.";
/// Message when a non-privileged caller tries to reassign the sales contact.
pub const SALES_CONTACT_READONLY: &str = "Vous ne pouvez pas modifier le commercial attribué.";
/// Message when the assigned contact is not a sales employee.
pub const SALES_CONTACT_WRONG_DEPARTMENT: &str =
    "Le commercial attribué doit appartenir au département Commercial.";

/// Request data for creating a client
#[derive(Debug, Clone)]
pub struct CreateClientRequest {
    pub company_name: String,
    pub siren: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// The creating sales employee becomes the assigned contact.
    pub sales_contact_id: Uuid,
    pub locations: Vec<LocationInput>,
}

/// Partial update for a client
#[derive(Debug, Clone, Default)]
pub struct UpdateClientRequest {
    pub company_name: Option<String>,
    pub siren: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contract_requested: Option<bool>,
    /// Privileged reassignment of the sales contact by employee id.
    pub updated_sales_contact: Option<Uuid>,
}

impl CreateClientRequest {
    fn validate(&self) -> Result<(), RepositoryError> {
        let mut errors = FieldErrors::new();
        errors.check(
            "company_name",
            validation::validate_charfield(&self.company_name),
        );
        errors.check("siren", validation::validate_siren(&self.siren));
        if let Some(ref first_name) = self.first_name {
            errors.check("first_name", validation::validate_alpha(first_name));
        }
        if let Some(ref last_name) = self.last_name {
            errors.check("last_name", validation::validate_alpha(last_name));
        }
        if let Some(ref email) = self.email {
            errors.check("email", validation::validate_email(email));
        }
        if let Some(ref phone_number) = self.phone_number {
            errors.check("phone_number", validation::validate_phone(phone_number));
        }
        errors.into_result().map_err(RepositoryError::Validation)
    }
}

impl UpdateClientRequest {
    fn validate(&self) -> Result<(), RepositoryError> {
        let mut errors = FieldErrors::new();
        if let Some(ref company_name) = self.company_name {
            errors.check("company_name", validation::validate_charfield(company_name));
        }
        if let Some(ref siren) = self.siren {
            errors.check("siren", validation::validate_siren(siren));
        }
        if let Some(ref first_name) = self.first_name {
            errors.check("first_name", validation::validate_alpha(first_name));
        }
        if let Some(ref last_name) = self.last_name {
            errors.check("last_name", validation::validate_alpha(last_name));
        }
        if let Some(ref email) = self.email {
            errors.check("email", validation::validate_email(email));
        }
        if let Some(ref phone_number) = self.phone_number {
            errors.check("phone_number", validation::validate_phone(phone_number));
        }
        errors.into_result().map_err(RepositoryError::Validation)
    }
}

/// Repository for client operations
pub struct ClientRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ClientRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a client assigned to a sales employee.
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<client::Model, RepositoryError> {
        request.validate()?;
        for location in &request.locations {
            location.validate()?;
        }

        let txn = self.db.begin().await?;

        ensure_sales_department(&txn, request.sales_contact_id).await?;

        let now = Utc::now();
        let client = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(request.company_name),
            siren: Set(request.siren),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email: Set(request.email),
            phone_number: Set(request.phone_number),
            contract_requested: Set(false),
            sales_contact_id: Set(Some(request.sales_contact_id)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        for input in &request.locations {
            let location = location::get_or_create(&txn, input).await?;
            location::link(&txn, LocationOwner::Client(client.id), location.id).await?;
        }

        txn.commit().await?;
        Ok(client)
    }

    /// List all clients ordered by company name.
    pub async fn list_clients(&self) -> Result<Vec<client::Model>, RepositoryError> {
        let clients = Client::find()
            .order_by_asc(client::Column::CompanyName)
            .all(self.db)
            .await?;
        Ok(clients)
    }

    /// Get a client by id.
    pub async fn get_client(
        &self,
        client_id: Uuid,
    ) -> Result<Option<client::Model>, RepositoryError> {
        Ok(Client::find_by_id(client_id).one(self.db).await?)
    }

    /// Update a client; reassignment goes through `updated_sales_contact`.
    pub async fn update_client(
        &self,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<client::Model, RepositoryError> {
        request.validate()?;

        let txn = self.db.begin().await?;

        let client = Client::find_by_id(client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Client introuvable.".to_string()))?;

        if let Some(employee_id) = request.updated_sales_contact {
            ensure_sales_department(&txn, employee_id).await?;
        }

        let mut active = client.into_active_model();
        if let Some(company_name) = request.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(siren) = request.siren {
            active.siren = Set(siren);
        }
        if let Some(first_name) = request.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(phone_number) = request.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        if let Some(contract_requested) = request.contract_requested {
            active.contract_requested = Set(contract_requested);
        }
        if let Some(employee_id) = request.updated_sales_contact {
            active.sales_contact_id = Set(Some(employee_id));
        }
        active.updated_at = Set(Utc::now().into());
        let client = active.update(&txn).await?;

        txn.commit().await?;
        Ok(client)
    }

    /// Delete a client unless a signed contract exists, pruning locations
    /// that lose their last reference.
    pub async fn delete_client(&self, client_id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let client = Client::find_by_id(client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Client introuvable.".to_string()))?;

        let signed_contracts = Contract::find()
            .filter(contract::Column::ClientId.eq(client_id))
            .filter(contract::Column::IsSigned.eq(true))
            .count(&txn)
            .await?;
        if signed_contracts > 0 {
            return Err(RepositoryError::precondition(CLIENT_HAS_SIGNED_CONTRACT));
        }

        // Gather every location owned by the client or by events of its
        // contracts before the cascade removes the join rows.
        let mut location_ids =
            location::owned_location_ids(&txn, LocationOwner::Client(client_id)).await?;

        let contract_ids: Vec<Uuid> = Contract::find()
            .filter(contract::Column::ClientId.eq(client_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect();
        if !contract_ids.is_empty() {
            let events = Event::find()
                .filter(event::Column::ContractId.is_in(contract_ids))
                .all(&txn)
                .await?;
            for event in events {
                location_ids.extend(
                    location::owned_location_ids(&txn, LocationOwner::Event(event.id)).await?,
                );
            }
        }

        client.delete(&txn).await?;

        for location_id in location_ids {
            location::prune_if_orphan(&txn, location_id).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

/// The assigned contact must exist and belong to the SALES department.
pub(crate) async fn ensure_sales_department<C: ConnectionTrait>(
    conn: &C,
    employee_id: Uuid,
) -> Result<(), RepositoryError> {
    let employee = Employee::find_by_id(employee_id)
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Employé introuvable.".to_string()))?;

    if employee.department != Department::Sales {
        return Err(RepositoryError::validation(
            "sales_contact",
            SALES_CONTACT_WRONG_DEPARTMENT,
        ));
    }

    Ok(())
}
