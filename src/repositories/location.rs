//! # Location Repository
//!
//! Shared, de-duplicated address rows. Adding a location get-or-creates on
//! the unique (street_number, street_name, city) triple and links through the
//! owner's join table; removing one unlinks, and deletes the row only when no
//! client or event references it anymore. Whole-owner deletion goes through
//! [`prune_if_orphan`] for each of the owner's locations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    Client, ClientLocation, Event, EventLocation, Location, client_location, event_location,
    location,
};
use crate::validation::{self, FieldErrors};

/// Message when a shared location cannot be edited in place.
pub const LOCATION_IN_USE: &str =
    "Ce lieu est utilisé par un autre modèle. Vous devez le supprimer de ce modèle.";

/// Address fields for get-or-create and updates
#[derive(Debug, Clone)]
pub struct LocationInput {
    pub street_number: i32,
    pub street_name: String,
    pub city: String,
    pub zip_code: String,
    pub country: String,
}

impl LocationInput {
    /// Validate every address field, collecting all failures.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        let mut errors = FieldErrors::new();
        if self.street_number < 0 {
            errors.push("street_number", "Un nombre entier valide est requis.");
        }
        errors.check("street_name", validation::validate_charfield(&self.street_name));
        errors.check("city", validation::validate_alpha(&self.city));
        errors.check("zip_code", validation::validate_zip_code(&self.zip_code));
        errors.check("country", validation::validate_alpha(&self.country));
        errors.into_result().map_err(RepositoryError::Validation)
    }
}

/// Owner side of a location link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOwner {
    Client(Uuid),
    Event(Uuid),
}

/// What happened when a location was removed from an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Still referenced elsewhere; only the link was removed.
    Unlinked,
    /// Last reference; the location row was deleted.
    Deleted,
}

/// Repository for shared location operations
pub struct LocationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> LocationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// List the locations linked to an owner.
    pub async fn list_for_owner(
        &self,
        owner: LocationOwner,
    ) -> Result<Vec<location::Model>, RepositoryError> {
        let ids = owned_location_ids(self.db, owner).await?;
        let locations = Location::find()
            .filter(location::Column::Id.is_in(ids))
            .order_by_asc(location::Column::ZipCode)
            .all(self.db)
            .await?;
        Ok(locations)
    }

    /// Get one location, checking it is linked to the owner.
    pub async fn get_for_owner(
        &self,
        owner: LocationOwner,
        location_id: Uuid,
    ) -> Result<Option<location::Model>, RepositoryError> {
        if !is_linked(self.db, owner, location_id).await? {
            return Ok(None);
        }
        Ok(Location::find_by_id(location_id).one(self.db).await?)
    }

    /// Add a location to an owner, get-or-creating the shared row.
    pub async fn add_to_owner(
        &self,
        owner: LocationOwner,
        input: LocationInput,
    ) -> Result<location::Model, RepositoryError> {
        input.validate()?;
        ensure_owner_exists(self.db, owner).await?;

        let txn = self.db.begin().await?;
        let location = get_or_create(&txn, &input).await?;
        link(&txn, owner, location.id).await?;
        txn.commit().await?;

        Ok(location)
    }

    /// Update a location in place.
    ///
    /// Only allowed while this owner holds the sole reference; a shared row
    /// must be unlinked instead so the other owners keep their address.
    pub async fn update_for_owner(
        &self,
        owner: LocationOwner,
        location_id: Uuid,
        input: LocationInput,
    ) -> Result<location::Model, RepositoryError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        if !is_linked(&txn, owner, location_id).await? {
            return Err(RepositoryError::NotFound("Lieu introuvable.".to_string()));
        }

        if reference_count(&txn, location_id).await? > 1 {
            return Err(RepositoryError::precondition(LOCATION_IN_USE));
        }

        let location = Location::find_by_id(location_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Lieu introuvable.".to_string()))?;

        let mut active = location.into_active_model();
        active.street_number = Set(input.street_number);
        active.street_name = Set(input.street_name);
        active.city = Set(input.city);
        active.zip_code = Set(input.zip_code);
        active.country = Set(input.country);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }

    /// Remove a location from an owner: unlink, then delete the row if this
    /// was the last reference.
    pub async fn remove_from_owner(
        &self,
        owner: LocationOwner,
        location_id: Uuid,
    ) -> Result<RemovalOutcome, RepositoryError> {
        let txn = self.db.begin().await?;

        if !is_linked(&txn, owner, location_id).await? {
            return Err(RepositoryError::NotFound("Lieu introuvable.".to_string()));
        }

        unlink(&txn, owner, location_id).await?;
        let outcome = if prune_if_orphan(&txn, location_id).await? {
            RemovalOutcome::Deleted
        } else {
            RemovalOutcome::Unlinked
        };

        txn.commit().await?;
        Ok(outcome)
    }
}

/// Find the shared row for this address or create it.
pub(crate) async fn get_or_create<C: ConnectionTrait>(
    conn: &C,
    input: &LocationInput,
) -> Result<location::Model, RepositoryError> {
    let existing = Location::find()
        .filter(location::Column::StreetNumber.eq(input.street_number))
        .filter(location::Column::StreetName.eq(input.street_name.clone()))
        .filter(location::Column::City.eq(input.city.clone()))
        .one(conn)
        .await?;

    if let Some(location) = existing {
        return Ok(location);
    }

    let location = location::ActiveModel {
        id: Set(Uuid::new_v4()),
        street_number: Set(input.street_number),
        street_name: Set(input.street_name.clone()),
        city: Set(input.city.clone()),
        zip_code: Set(input.zip_code.clone()),
        country: Set(input.country.clone()),
    }
    .insert(conn)
    .await?;

    Ok(location)
}

/// Total references to a location across clients and events.
pub(crate) async fn reference_count<C: ConnectionTrait>(
    conn: &C,
    location_id: Uuid,
) -> Result<u64, RepositoryError> {
    let client_refs = ClientLocation::find()
        .filter(client_location::Column::LocationId.eq(location_id))
        .count(conn)
        .await?;
    let event_refs = EventLocation::find()
        .filter(event_location::Column::LocationId.eq(location_id))
        .count(conn)
        .await?;
    Ok(client_refs + event_refs)
}

/// Delete the location row if nothing references it anymore.
/// Returns true when the row was deleted.
pub(crate) async fn prune_if_orphan<C: ConnectionTrait>(
    conn: &C,
    location_id: Uuid,
) -> Result<bool, RepositoryError> {
    if reference_count(conn, location_id).await? > 0 {
        return Ok(false);
    }

    let Some(location) = Location::find_by_id(location_id).one(conn).await? else {
        return Ok(false);
    };
    location.delete(conn).await?;
    Ok(true)
}

/// Location ids linked to an owner.
pub(crate) async fn owned_location_ids<C: ConnectionTrait>(
    conn: &C,
    owner: LocationOwner,
) -> Result<Vec<Uuid>, RepositoryError> {
    let ids = match owner {
        LocationOwner::Client(client_id) => ClientLocation::find()
            .filter(client_location::Column::ClientId.eq(client_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| link.location_id)
            .collect(),
        LocationOwner::Event(event_id) => EventLocation::find()
            .filter(event_location::Column::EventId.eq(event_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| link.location_id)
            .collect(),
    };
    Ok(ids)
}

pub(crate) async fn link<C: ConnectionTrait>(
    conn: &C,
    owner: LocationOwner,
    location_id: Uuid,
) -> Result<(), RepositoryError> {
    if is_linked(conn, owner, location_id).await? {
        return Ok(());
    }

    match owner {
        LocationOwner::Client(client_id) => {
            client_location::ActiveModel {
                client_id: Set(client_id),
                location_id: Set(location_id),
            }
            .insert(conn)
            .await?;
        }
        LocationOwner::Event(event_id) => {
            event_location::ActiveModel {
                event_id: Set(event_id),
                location_id: Set(location_id),
            }
            .insert(conn)
            .await?;
        }
    }
    Ok(())
}

async fn unlink<C: ConnectionTrait>(
    conn: &C,
    owner: LocationOwner,
    location_id: Uuid,
) -> Result<(), RepositoryError> {
    match owner {
        LocationOwner::Client(client_id) => {
            ClientLocation::delete_many()
                .filter(client_location::Column::ClientId.eq(client_id))
                .filter(client_location::Column::LocationId.eq(location_id))
                .exec(conn)
                .await?;
        }
        LocationOwner::Event(event_id) => {
            EventLocation::delete_many()
                .filter(event_location::Column::EventId.eq(event_id))
                .filter(event_location::Column::LocationId.eq(location_id))
                .exec(conn)
                .await?;
        }
    }
    Ok(())
}

async fn is_linked<C: ConnectionTrait>(
    conn: &C,
    owner: LocationOwner,
    location_id: Uuid,
) -> Result<bool, RepositoryError> {
    let count = match owner {
        LocationOwner::Client(client_id) => {
            ClientLocation::find()
                .filter(client_location::Column::ClientId.eq(client_id))
                .filter(client_location::Column::LocationId.eq(location_id))
                .count(conn)
                .await?
        }
        LocationOwner::Event(event_id) => {
            EventLocation::find()
                .filter(event_location::Column::EventId.eq(event_id))
                .filter(event_location::Column::LocationId.eq(location_id))
                .count(conn)
                .await?
        }
    };
    Ok(count > 0)
}

async fn ensure_owner_exists<C: ConnectionTrait>(
    conn: &C,
    owner: LocationOwner,
) -> Result<(), RepositoryError> {
    let exists = match owner {
        LocationOwner::Client(client_id) => {
            Client::find_by_id(client_id).one(conn).await?.is_some()
        }
        LocationOwner::Event(event_id) => Event::find_by_id(event_id).one(conn).await?.is_some(),
    };

    if exists {
        Ok(())
    } else {
        let message = match owner {
            LocationOwner::Client(_) => "Client introuvable.",
            LocationOwner::Event(_) => "Événement introuvable.",
        };
        Err(RepositoryError::NotFound(message.to_string()))
    }
}
