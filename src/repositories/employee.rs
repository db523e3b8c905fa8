//! # Employee Repository
//!
//! Creates, updates, and deletes employees together with their user account.
//! The cross-entity effects the original system hid in save/delete hooks are
//! explicit here: the staff flag is re-derived from the department on every
//! write, and deleting an employee deletes the linked user in the same
//! transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::auth;
use crate::error::RepositoryError;
use crate::models::employee::Department;
use crate::models::{Employee, User, employee, user};

/// Conflict message when the requested email is already attributed.
pub const EMAIL_TAKEN: &str = "Cette adresse email est déjà attribuée.";

/// Request data for creating an employee and their user account
#[derive(Debug, Clone)]
pub struct CreateEmployeeRequest {
    pub employee_number: i32,
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub email: String,
    /// Raw password; hashed with Argon2id before storage.
    pub password: String,
}

/// Partial update for an employee and the nested user account
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeRequest {
    pub employee_number: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<Department>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for employee + user lifecycle operations
pub struct EmployeeRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> EmployeeRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create an employee and their user account in one transaction.
    ///
    /// The user's is_staff flag tracks the department: MANAGEMENT is the only
    /// staff department.
    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> Result<(employee::Model, user::Model), RepositoryError> {
        let txn = self.db.begin().await?;

        if email_taken(&txn, &request.email, None).await? {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let password_hash = auth::hash_password(&request.password)
            .map_err(|err| RepositoryError::Internal(format!("password hashing failed: {err}")))?;

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(request.email),
            password_hash: Set(password_hash),
            is_active: Set(true),
            is_staff: Set(request.department.grants_staff()),
            is_superuser: Set(false),
            date_joined: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let employee = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_number: Set(request.employee_number),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            department: Set(request.department),
            user_id: Set(user.id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok((employee, user))
    }

    /// List all employees with their user account.
    pub async fn list_employees(
        &self,
    ) -> Result<Vec<(employee::Model, user::Model)>, RepositoryError> {
        let rows = Employee::find()
            .find_also_related(User)
            .order_by_asc(employee::Column::EmployeeNumber)
            .all(self.db)
            .await?;

        rows.into_iter()
            .map(|(employee, user)| {
                let employee_id = employee.id;
                user.map(|user| (employee, user)).ok_or_else(|| {
                    RepositoryError::Internal(format!("employee {} has no user", employee_id))
                })
            })
            .collect()
    }

    /// Get an employee with their user account by id.
    pub async fn get_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<(employee::Model, user::Model)>, RepositoryError> {
        let row = Employee::find_by_id(employee_id)
            .find_also_related(User)
            .one(self.db)
            .await?;

        match row {
            Some((employee, Some(user))) => Ok(Some((employee, user))),
            Some((employee, None)) => Err(RepositoryError::Internal(format!(
                "employee {} has no user",
                employee.id
            ))),
            None => Ok(None),
        }
    }

    /// Get an employee by id, without the user account.
    pub async fn find_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Option<employee::Model>, RepositoryError> {
        Ok(Employee::find_by_id(employee_id).one(self.db).await?)
    }

    /// Update an employee and the nested user fields.
    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<(employee::Model, user::Model), RepositoryError> {
        let txn = self.db.begin().await?;

        let employee = Employee::find_by_id(employee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Employé introuvable.".to_string()))?;

        let user = User::find_by_id(employee.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                RepositoryError::Internal(format!("employee {} has no user", employee.id))
            })?;

        if let Some(ref email) = request.email
            && email != &user.email
            && email_taken(&txn, email, Some(user.id)).await?
        {
            return Err(RepositoryError::Conflict(EMAIL_TAKEN.to_string()));
        }

        let department = request.department.unwrap_or(employee.department);

        let mut active_user = user.into_active_model();
        if let Some(email) = request.email {
            active_user.email = Set(email);
        }
        if let Some(is_active) = request.is_active {
            active_user.is_active = Set(is_active);
        }
        // Keep the staff flag in lockstep with the (possibly new) department.
        active_user.is_staff = Set(department.grants_staff());
        let user = active_user.update(&txn).await?;

        let mut active_employee = employee.into_active_model();
        if let Some(employee_number) = request.employee_number {
            active_employee.employee_number = Set(employee_number);
        }
        if let Some(first_name) = request.first_name {
            active_employee.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            active_employee.last_name = Set(last_name);
        }
        active_employee.department = Set(department);
        active_employee.updated_at = Set(Utc::now().into());
        let employee = active_employee.update(&txn).await?;

        txn.commit().await?;
        Ok((employee, user))
    }

    /// Delete an employee and their user account in one transaction.
    pub async fn delete_employee(&self, employee_id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let employee = Employee::find_by_id(employee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Employé introuvable.".to_string()))?;

        let user = User::find_by_id(employee.user_id).one(&txn).await?;

        employee.delete(&txn).await?;
        if let Some(user) = user {
            user.delete(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

async fn email_taken<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    excluding_user: Option<Uuid>,
) -> Result<bool, RepositoryError> {
    let mut query = User::find().filter(user::Column::Email.eq(email));
    if let Some(user_id) = excluding_user {
        query = query.filter(user::Column::Id.ne(user_id));
    }
    Ok(query.one(conn).await?.is_some())
}
