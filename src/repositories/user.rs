//! # User Repository
//!
//! Account lookups for the authentication flow. User rows are created and
//! deleted through [`EmployeeRepository`](super::EmployeeRepository); this
//! repository only reads them.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{User, user};

/// Repository for user account lookups
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Find a user by login email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, RepositoryError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?;

        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>, RepositoryError> {
        let user = User::find_by_id(user_id).one(self.db).await?;

        Ok(user)
    }
}
