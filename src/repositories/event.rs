//! # Event Repository
//!
//! Event lifecycle: one event per signed contract. The existence check runs
//! inside the creation transaction and the unique index on contract_id backs
//! it, so a racing duplicate loses at the database instead of slipping in.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
    TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::employee::Department;
use crate::models::{Contract, Employee, Event, employee, event};
use crate::repositories::location::{self, LocationInput, LocationOwner};
use crate::validation::{self, FieldErrors};

/// Message when the contract already has its event.
pub const EVENT_EXISTS: &str = "Un événement existe déjà pour ce contrat.";
/// Message when the contract is not signed yet.
pub const CONTRACT_NOT_SIGNED: &str = "Le contrat doit être signé pour créer un événement.";
/// Message when a non-privileged caller tries to reassign the support contact.
pub const SUPPORT_CONTACT_READONLY: &str = "Vous ne pouvez pas modifier le support attribué.";
/// Message when the assigned contact is not a support employee.
pub const SUPPORT_CONTACT_WRONG_DEPARTMENT: &str =
    "Le support attribué doit appartenir au département Support.";
/// Message when the event would start in the past.
pub const START_DATE_PAST: &str =
    "La date de début de l'événement ne peut pas être antérieure à la date du jour.";
/// Message when the event ends before it starts.
pub const END_BEFORE_START: &str =
    "La date de fin de l'événement doit être postérieure à la date de début.";

/// Request data for creating an event
#[derive(Debug, Clone)]
pub struct CreateEventRequest {
    pub name: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub attendees: i32,
    pub notes: Option<String>,
    pub locations: Vec<LocationInput>,
}

/// Partial update for an event
#[derive(Debug, Clone, Default)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub attendees: Option<i32>,
    pub notes: Option<String>,
    /// Privileged reassignment of the support contact by employee id.
    pub updated_support_contact: Option<Uuid>,
}

/// List filters for the event overview
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Order by start date, hiding events already past.
    pub upcoming_only: bool,
    /// Keep only events with (true) or without (false) a support contact.
    pub null_support_contact: Option<bool>,
    /// Restrict to the events assigned to this employee.
    pub support_contact_id: Option<Uuid>,
    pub support_contact_first_name: Option<String>,
    pub support_contact_last_name: Option<String>,
}

impl CreateEventRequest {
    fn validate(&self) -> Result<(), RepositoryError> {
        let mut errors = FieldErrors::new();
        if let Some(ref name) = self.name {
            errors.check("event_name", validation::validate_charfield(name));
        }
        if let Some(ref notes) = self.notes {
            errors.check("notes", validation::validate_textfield(notes));
        }
        if self.attendees < 0 {
            errors.push("attendees", "Un nombre entier valide est requis.");
        }
        if self.start_date < Utc::now() {
            errors.push("start_date", START_DATE_PAST);
        }
        if self.end_date < self.start_date {
            errors.push("end_date", END_BEFORE_START);
        }
        errors.into_result().map_err(RepositoryError::Validation)
    }
}

impl UpdateEventRequest {
    fn validate(&self) -> Result<(), RepositoryError> {
        let mut errors = FieldErrors::new();
        if let Some(ref name) = self.name {
            errors.check("event_name", validation::validate_charfield(name));
        }
        if let Some(ref notes) = self.notes {
            errors.check("notes", validation::validate_textfield(notes));
        }
        if let Some(attendees) = self.attendees
            && attendees < 0
        {
            errors.push("attendees", "Un nombre entier valide est requis.");
        }
        errors.into_result().map_err(RepositoryError::Validation)
    }
}

/// Repository for event operations
pub struct EventRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EventRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create the event of a signed contract.
    pub async fn create_event(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
        request: CreateEventRequest,
    ) -> Result<event::Model, RepositoryError> {
        request.validate()?;
        for input in &request.locations {
            input.validate()?;
        }

        let txn = self.db.begin().await?;

        let contract = Contract::find_by_id(contract_id)
            .one(&txn)
            .await?
            .filter(|contract| contract.client_id == client_id)
            .ok_or_else(|| RepositoryError::NotFound("Contrat introuvable.".to_string()))?;

        if !contract.is_signed {
            return Err(RepositoryError::precondition(CONTRACT_NOT_SIGNED));
        }

        let existing = Event::find()
            .filter(event::Column::ContractId.eq(contract.id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::precondition(EVENT_EXISTS));
        }

        let now = Utc::now();
        let event = event::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            attendees: Set(request.attendees),
            notes: Set(request.notes),
            contract_id: Set(contract.id),
            support_contact_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        for input in &request.locations {
            let location = location::get_or_create(&txn, input).await?;
            location::link(&txn, LocationOwner::Event(event.id), location.id).await?;
        }

        txn.commit().await?;
        Ok(event)
    }

    /// Get the event of a contract, checking the nesting chain.
    pub async fn get_event(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<event::Model>, RepositoryError> {
        let event = Event::find_by_id(event_id)
            .one(self.db)
            .await?
            .filter(|event| event.contract_id == contract_id);

        let Some(event) = event else {
            return Ok(None);
        };

        let contract_matches = Contract::find_by_id(contract_id)
            .one(self.db)
            .await?
            .map(|contract| contract.client_id == client_id)
            .unwrap_or(false);

        Ok(contract_matches.then_some(event))
    }

    /// Update an event; support reassignment goes through
    /// `updated_support_contact`.
    pub async fn update_event(
        &self,
        client_id: Uuid,
        contract_id: Uuid,
        event_id: Uuid,
        request: UpdateEventRequest,
    ) -> Result<event::Model, RepositoryError> {
        request.validate()?;

        let txn = self.db.begin().await?;

        let event = Event::find_by_id(event_id)
            .one(&txn)
            .await?
            .filter(|event| event.contract_id == contract_id)
            .ok_or_else(|| RepositoryError::NotFound("Événement introuvable.".to_string()))?;

        let contract_matches = Contract::find_by_id(contract_id)
            .one(&txn)
            .await?
            .map(|contract| contract.client_id == client_id)
            .unwrap_or(false);
        if !contract_matches {
            return Err(RepositoryError::NotFound("Événement introuvable.".to_string()));
        }

        let start_date = request.start_date.unwrap_or(event.start_date);
        let end_date = request.end_date.unwrap_or(event.end_date);
        if end_date < start_date {
            return Err(RepositoryError::validation("end_date", END_BEFORE_START));
        }

        if let Some(employee_id) = request.updated_support_contact {
            ensure_support_department(&txn, employee_id).await?;
        }

        let mut active = event.into_active_model();
        if let Some(name) = request.name {
            active.name = Set(Some(name));
        }
        active.start_date = Set(start_date);
        active.end_date = Set(end_date);
        if let Some(attendees) = request.attendees {
            active.attendees = Set(attendees);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(employee_id) = request.updated_support_contact {
            active.support_contact_id = Set(Some(employee_id));
        }
        active.updated_at = Set(Utc::now().into());
        let event = active.update(&txn).await?;

        txn.commit().await?;
        Ok(event)
    }

    /// Event overview across contracts, with support-contact filters.
    pub async fn list_events(
        &self,
        filter: EventFilter,
    ) -> Result<Vec<event::Model>, RepositoryError> {
        let mut query = Event::find();

        if filter.upcoming_only {
            query = query
                .filter(event::Column::StartDate.gte(Utc::now()))
                .order_by_asc(event::Column::StartDate);
        } else {
            query = query.order_by_desc(event::Column::CreatedAt);
        }

        if let Some(is_null) = filter.null_support_contact {
            query = if is_null {
                query.filter(event::Column::SupportContactId.is_null())
            } else {
                query.filter(event::Column::SupportContactId.is_not_null())
            };
        }

        if let Some(employee_id) = filter.support_contact_id {
            query = query.filter(event::Column::SupportContactId.eq(employee_id));
        }

        let name_filtered = filter.support_contact_first_name.is_some()
            || filter.support_contact_last_name.is_some();
        if name_filtered {
            query = query.join(JoinType::InnerJoin, event::Relation::SupportContact.def());
            if let Some(first_name) = filter.support_contact_first_name {
                query = query.filter(employee::Column::FirstName.contains(first_name));
            }
            if let Some(last_name) = filter.support_contact_last_name {
                query = query.filter(employee::Column::LastName.contains(last_name));
            }
        }

        Ok(query.all(self.db).await?)
    }
}

/// The assigned contact must exist and belong to the SUPPORT department.
pub(crate) async fn ensure_support_department<C: ConnectionTrait>(
    conn: &C,
    employee_id: Uuid,
) -> Result<(), RepositoryError> {
    let employee = Employee::find_by_id(employee_id)
        .one(conn)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Employé introuvable.".to_string()))?;

    if employee.department != Department::Support {
        return Err(RepositoryError::validation(
            "support_contact",
            SUPPORT_CONTACT_WRONG_DEPARTMENT,
        ));
    }

    Ok(())
}
