//! Location entity model
//!
//! Shared, de-duplicated address rows referenced by clients and events.
//! Reference counting across the two join tables decides when a row dies.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// Unique identifier for the location (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub street_number: i32,

    pub street_name: String,

    pub city: String,

    /// 5-digit postal code
    pub zip_code: String,

    pub country: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_location::Entity")]
    ClientLocation,
    #[sea_orm(has_many = "super::event_location::Entity")]
    EventLocation,
}

impl ActiveModelBehavior for ActiveModel {}
