//! Client entity model
//!
//! A client belongs to one sales employee and carries the contract_requested
//! flag that gates contract creation. The SIREN is unique to avoid duplicate
//! companies.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    /// Unique identifier for the client (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub company_name: String,

    /// 9-digit SIREN company number, unique
    pub siren: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub email: Option<String>,

    pub phone_number: Option<String>,

    /// Set by the sales contact when the client asks for a contract;
    /// reset to false when the contract is created
    pub contract_requested: bool,

    /// Assigned sales employee, null after that employee is deleted
    pub sales_contact_id: Option<Uuid>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::SalesContactId",
        to = "super::employee::Column::Id"
    )]
    SalesContact,
    #[sea_orm(has_many = "super::contract::Entity")]
    Contract,
    #[sea_orm(has_many = "super::client_location::Entity")]
    ClientLocation,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesContact.def()
    }
}

impl Related<super::contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contract.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
