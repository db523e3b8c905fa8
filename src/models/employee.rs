//! Employee entity model
//!
//! An employee is the 1:1 profile of a user. The department column decides
//! the capability set (see `authz`) and whether the linked user is staff.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Department an employee belongs to, exactly one at a time.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Department {
    #[sea_orm(string_value = "MANAGEMENT")]
    Management,
    #[sea_orm(string_value = "SALES")]
    Sales,
    #[sea_orm(string_value = "SUPPORT")]
    Support,
}

impl Department {
    /// Whether this department grants the staff flag to the linked user.
    pub fn grants_staff(self) -> bool {
        matches!(self, Department::Management)
    }
}

/// Epic Events employee profile
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Company-assigned employee number, unique
    pub employee_number: i32,

    pub first_name: String,

    pub last_name: String,

    pub department: Department,

    /// Linked user account, one per employee
    pub user_id: Uuid,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::client::Entity")]
    Client,
    #[sea_orm(has_many = "super::event::Entity")]
    Event,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn management_is_the_only_staff_department() {
        assert!(Department::Management.grants_staff());
        assert!(!Department::Sales.grants_staff());
        assert!(!Department::Support.grants_staff());
    }

    #[test]
    fn department_serializes_screaming_snake() {
        let json = serde_json::to_string(&Department::Management).unwrap();
        assert_eq!(json, "\"MANAGEMENT\"");
        let parsed: Department = serde_json::from_str("\"SUPPORT\"").unwrap();
        assert_eq!(parsed, Department::Support);
    }
}
