//! # Authorization
//!
//! Composable authorization predicates. Each endpoint combines a handful of
//! small boolean checks instead of a dynamic permission expression, so every
//! rule is a plain function that can be unit-tested directly.
//!
//! The department capability matrix mirrors the company's retention policy:
//! nobody gets a delete capability on customer data by default, management
//! owns the employee/user records, sales own their clients, support own the
//! locations of their events.

use crate::auth::CurrentUser;
use crate::error::{ApiError, forbidden};
use crate::models::employee::Department;
use crate::models::{client, event};

/// Everything a department capability can gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddUser,
    ChangeUser,
    ViewUser,
    AddEmployee,
    ChangeEmployee,
    DeleteEmployee,
    ViewEmployee,
    AddLocation,
    ChangeLocation,
    ViewLocation,
    AddClient,
    ViewClient,
    AddContract,
    ChangeContract,
    ViewContract,
    ChangeEvent,
    ViewEvent,
}

/// Fixed capability matrix per department.
pub fn department_can(department: Department, action: Action) -> bool {
    use Action::*;

    match department {
        Department::Management => matches!(
            action,
            AddUser
                | ChangeUser
                | ViewUser
                | AddEmployee
                | ChangeEmployee
                | DeleteEmployee
                | ViewEmployee
                | ViewLocation
                | ViewClient
                | AddContract
                | ChangeContract
                | ViewContract
                | ChangeEvent
                | ViewEvent
        ),
        Department::Sales => matches!(
            action,
            AddLocation
                | ChangeLocation
                | ViewLocation
                | AddClient
                | ViewClient
                | ViewContract
                | ViewEvent
        ),
        Department::Support => matches!(action, AddLocation | ChangeLocation | ViewLocation),
    }
}

/// Staff (management) or superuser.
pub fn is_admin(requester: &CurrentUser) -> bool {
    requester.is_staff() || requester.is_superuser()
}

/// The requester holds the capability through their department; superusers
/// always pass.
pub fn can(requester: &CurrentUser, action: Action) -> bool {
    if requester.is_superuser() {
        return true;
    }
    requester
        .department()
        .map(|department| department_can(department, action))
        .unwrap_or(false)
}

/// Object-level check: the requester is the client's assigned sales contact.
pub fn is_sales_contact(requester: &CurrentUser, client: &client::Model) -> bool {
    if requester.is_superuser() {
        return true;
    }
    match (requester.employee_id(), client.sales_contact_id) {
        (Some(employee_id), Some(sales_contact_id)) => employee_id == sales_contact_id,
        _ => false,
    }
}

/// Object-level check: the requester is the event's assigned support contact.
pub fn is_support_contact(requester: &CurrentUser, event: &event::Model) -> bool {
    if requester.is_superuser() {
        return true;
    }
    match (requester.employee_id(), event.support_contact_id) {
        (Some(employee_id), Some(support_contact_id)) => employee_id == support_contact_id,
        _ => false,
    }
}

/// Convert a predicate outcome into the fixed 403 response.
pub fn require(allowed: bool) -> Result<(), ApiError> {
    if allowed { Ok(()) } else { Err(forbidden()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{employee, user};
    use chrono::Utc;
    use uuid::Uuid;

    fn make_user(is_staff: bool, is_superuser: bool) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "employee@epicevents.fr".to_string(),
            password_hash: "hash".to_string(),
            is_active: true,
            is_staff,
            is_superuser,
            date_joined: Utc::now().into(),
        }
    }

    fn make_employee(user_id: Uuid, department: Department) -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            employee_number: 1,
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            department,
            user_id,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn make_requester(department: Department) -> CurrentUser {
        let user = make_user(department.grants_staff(), false);
        let employee = make_employee(user.id, department);
        CurrentUser {
            user,
            employee: Some(employee),
        }
    }

    fn make_client(sales_contact_id: Option<Uuid>) -> client::Model {
        client::Model {
            id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            siren: "452268192".to_string(),
            first_name: None,
            last_name: None,
            email: None,
            phone_number: None,
            contract_requested: false,
            sales_contact_id,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn make_event(support_contact_id: Option<Uuid>) -> event::Model {
        event::Model {
            id: Uuid::new_v4(),
            name: None,
            start_date: Utc::now().into(),
            end_date: Utc::now().into(),
            attendees: 10,
            notes: None,
            contract_id: Uuid::new_v4(),
            support_contact_id,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn matrix_matches_department_roles() {
        use Action::*;

        assert!(department_can(Department::Management, AddEmployee));
        assert!(department_can(Department::Management, AddContract));
        assert!(!department_can(Department::Management, AddClient));
        assert!(!department_can(Department::Management, AddLocation));

        assert!(department_can(Department::Sales, AddClient));
        assert!(department_can(Department::Sales, AddLocation));
        assert!(!department_can(Department::Sales, AddContract));
        assert!(!department_can(Department::Sales, AddEmployee));

        assert!(department_can(Department::Support, ChangeLocation));
        assert!(!department_can(Department::Support, ViewClient));
        assert!(!department_can(Department::Support, AddClient));
    }

    #[test]
    fn no_department_grants_deletes_on_customer_data() {
        // DeleteEmployee is the only delete capability in the matrix.
        for department in [
            Department::Management,
            Department::Sales,
            Department::Support,
        ] {
            assert_eq!(
                department_can(department, Action::DeleteEmployee),
                department == Department::Management
            );
        }
    }

    #[test]
    fn superuser_passes_every_capability() {
        let requester = CurrentUser {
            user: make_user(false, true),
            employee: None,
        };
        assert!(can(&requester, Action::AddClient));
        assert!(can(&requester, Action::DeleteEmployee));
    }

    #[test]
    fn user_without_employee_profile_has_no_capabilities() {
        let requester = CurrentUser {
            user: make_user(false, false),
            employee: None,
        };
        assert!(!can(&requester, Action::ViewClient));
    }

    #[test]
    fn sales_contact_check_compares_assignment() {
        let requester = make_requester(Department::Sales);
        let own_client = make_client(requester.employee_id());
        let other_client = make_client(Some(Uuid::new_v4()));
        let orphan_client = make_client(None);

        assert!(is_sales_contact(&requester, &own_client));
        assert!(!is_sales_contact(&requester, &other_client));
        assert!(!is_sales_contact(&requester, &orphan_client));
    }

    #[test]
    fn support_contact_check_compares_assignment() {
        let requester = make_requester(Department::Support);
        let own_event = make_event(requester.employee_id());
        let other_event = make_event(Some(Uuid::new_v4()));

        assert!(is_support_contact(&requester, &own_event));
        assert!(!is_support_contact(&requester, &other_event));
    }

    #[test]
    fn superuser_is_every_objects_contact() {
        let requester = CurrentUser {
            user: make_user(false, true),
            employee: None,
        };
        assert!(is_sales_contact(&requester, &make_client(None)));
        assert!(is_support_contact(&requester, &make_event(None)));
    }

    #[test]
    fn require_maps_to_fixed_403() {
        assert!(require(true).is_ok());
        let error = require(false).unwrap_err();
        assert_eq!(error.status, axum::http::StatusCode::FORBIDDEN);
        assert_eq!(
            error.message,
            Box::from("Vous n'avez pas la permission d'effectuer cette action.")
        );
    }
}
