//! # Contract Repository
//!
//! Contract lifecycle: creation is gated on the client's contract_requested
//! flag and consumes it in the same transaction; a signed contract can no
//! longer be deleted.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{Client, Contract, Event, contract, event};
use crate::repositories::location::{self, LocationOwner};
use crate::validation::{self, FieldErrors};

/// Message when the client has not requested a contract.
pub const CONTRACT_NOT_REQUESTED: &str = "La création de contrat n'est pas demandée.";
/// Message when deleting a signed contract.
pub const CONTRACT_SIGNED: &str = "Vous ne pouvez pas supprimer un contrat signé.";

/// Request data for creating a contract
#[derive(Debug, Clone)]
pub struct CreateContractRequest {
    pub description: Option<String>,
    pub amount: f64,
    pub payment_due: f64,
}

/// Partial update for a contract
#[derive(Debug, Clone, Default)]
pub struct UpdateContractRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub payment_due: Option<f64>,
    pub is_signed: Option<bool>,
}

/// List filters for contracts of a client
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractFilter {
    pub is_signed: Option<bool>,
    /// Keep contracts with payment_due strictly above this value, excluding
    /// fully settled ones.
    pub min_payment_due: Option<f64>,
}

fn validate_description(description: &Option<String>) -> Result<(), RepositoryError> {
    let mut errors = FieldErrors::new();
    if let Some(description) = description {
        errors.check(
            "contract_description",
            validation::validate_textfield(description),
        );
    }
    errors.into_result().map_err(RepositoryError::Validation)
}

/// Repository for contract operations
pub struct ContractRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ContractRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a contract for a client that requested one.
    ///
    /// The contract_requested flag is consumed inside the transaction, so two
    /// racing requests cannot both create a contract from one request.
    pub async fn create_contract(
        &self,
        client_id: Uuid,
        request: CreateContractRequest,
    ) -> Result<contract::Model, RepositoryError> {
        validate_description(&request.description)?;

        let txn = self.db.begin().await?;

        let client = Client::find_by_id(client_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Client introuvable.".to_string()))?;

        if !client.contract_requested {
            return Err(RepositoryError::precondition(CONTRACT_NOT_REQUESTED));
        }

        let now = Utc::now();
        let contract = contract::ActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(request.description),
            amount: Set(request.amount),
            payment_due: Set(request.payment_due),
            is_signed: Set(false),
            client_id: Set(client.id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut active_client = client.into_active_model();
        active_client.contract_requested = Set(false);
        active_client.updated_at = Set(now.into());
        active_client.update(&txn).await?;

        txn.commit().await?;
        Ok(contract)
    }

    /// List a client's contracts, signed first.
    pub async fn list_for_client(
        &self,
        client_id: Uuid,
        filter: ContractFilter,
    ) -> Result<Vec<contract::Model>, RepositoryError> {
        let mut query = Contract::find()
            .filter(contract::Column::ClientId.eq(client_id))
            .order_by_desc(contract::Column::IsSigned);

        if let Some(is_signed) = filter.is_signed {
            query = query.filter(contract::Column::IsSigned.eq(is_signed));
        }
        if let Some(min_payment_due) = filter.min_payment_due {
            query = query
                .filter(contract::Column::PaymentDue.gt(min_payment_due))
                .filter(contract::Column::PaymentDue.ne(0.0));
        }

        Ok(query.all(self.db).await?)
    }

    /// Get a contract, checking it belongs to the client.
    pub async fn get_contract(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Option<contract::Model>, RepositoryError> {
        let contract = Contract::find_by_id(contract_id)
            .one(self.db)
            .await?
            .filter(|contract| contract.client_id == client_id);
        Ok(contract)
    }

    /// Update a contract's terms or signature.
    pub async fn update_contract(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
        request: UpdateContractRequest,
    ) -> Result<contract::Model, RepositoryError> {
        validate_description(&request.description)?;

        let txn = self.db.begin().await?;

        let contract = Contract::find_by_id(contract_id)
            .one(&txn)
            .await?
            .filter(|contract| contract.client_id == client_id)
            .ok_or_else(|| RepositoryError::NotFound("Contrat introuvable.".to_string()))?;

        let mut active = contract.into_active_model();
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(amount) = request.amount {
            active.amount = Set(amount);
        }
        if let Some(payment_due) = request.payment_due {
            active.payment_due = Set(payment_due);
        }
        if let Some(is_signed) = request.is_signed {
            active.is_signed = Set(is_signed);
        }
        active.updated_at = Set(Utc::now().into());
        let contract = active.update(&txn).await?;

        txn.commit().await?;
        Ok(contract)
    }

    /// Delete an unsigned contract, cleaning up its event and the event's
    /// locations.
    pub async fn delete_contract(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let contract = Contract::find_by_id(contract_id)
            .one(&txn)
            .await?
            .filter(|contract| contract.client_id == client_id)
            .ok_or_else(|| RepositoryError::NotFound("Contrat introuvable.".to_string()))?;

        if contract.is_signed {
            return Err(RepositoryError::precondition(CONTRACT_SIGNED));
        }

        if let Some(event) = Event::find()
            .filter(event::Column::ContractId.eq(contract.id))
            .one(&txn)
            .await?
        {
            let location_ids =
                location::owned_location_ids(&txn, LocationOwner::Event(event.id)).await?;
            event.delete(&txn).await?;
            for location_id in location_ids {
                location::prune_if_orphan(&txn, location_id).await?;
            }
        }

        contract.delete(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
