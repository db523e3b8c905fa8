//! User entity model
//!
//! Users authenticate by email; the password is stored only as an Argon2id
//! hash. The is_staff flag is derived from the linked employee's department.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// User account identified by email
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email, unique across all users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Staff flag, forced by the employee's department
    pub is_staff: bool,

    /// Superuser flag, bypasses object-level checks
    pub is_superuser: bool,

    /// Timestamp when the account was created
    pub date_joined: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::employee::Entity")]
    Employee,
    #[sea_orm(has_many = "super::refresh_token::Entity")]
    RefreshToken,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::refresh_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RefreshToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
