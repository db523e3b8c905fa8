//! Event entity model
//!
//! One event per signed contract, enforced by a unique index on contract_id.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier for the event (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: Option<String>,

    pub start_date: DateTimeWithTimeZone,

    pub end_date: DateTimeWithTimeZone,

    pub attendees: i32,

    pub notes: Option<String>,

    /// Owning contract, unique across events
    pub contract_id: Uuid,

    /// Assigned support employee, null until management assigns one
    pub support_contact_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract::Entity",
        from = "Column::ContractId",
        to = "super::contract::Column::Id"
    )]
    Contract,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::SupportContactId",
        to = "super::employee::Column::Id"
    )]
    SupportContact,
    #[sea_orm(has_many = "super::event_location::Entity")]
    EventLocation,
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupportContact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
