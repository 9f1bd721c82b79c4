//! Authentication and authorization.
//!
//! Management endpoints authenticate with a JWT session cookie issued by the
//! login endpoint. Handlers receive the authenticated user through the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor and apply
//! role checks with the helpers here.

pub mod current_user;
pub mod password;
pub mod session;

use crate::api::models::users::{CurrentUser, Role};
use crate::errors::{Error, Result};

/// Admins and managers pass; everyone else is rejected.
pub fn require_manager(user: &CurrentUser) -> Result<()> {
    match user.role {
        Role::Admin | Role::Manager => Ok(()),
        Role::Employee => Err(Error::Forbidden {
            message: "Manager role required".to_string(),
        }),
    }
}

/// A "plain employee" is linked to an employee record and holds no
/// admin/manager role. Such users only ever see and touch their own rows.
pub fn is_plain_employee(user: &CurrentUser) -> bool {
    user.employee_id.is_some() && user.role == Role::Employee
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role, employee_id: Option<Uuid>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            role,
            employee_id,
        }
    }

    #[test]
    fn test_require_manager() {
        assert!(require_manager(&user(Role::Admin, None)).is_ok());
        assert!(require_manager(&user(Role::Manager, None)).is_ok());
        assert!(require_manager(&user(Role::Employee, Some(Uuid::new_v4()))).is_err());
    }

    #[test]
    fn test_plain_employee_needs_link_and_role() {
        assert!(is_plain_employee(&user(Role::Employee, Some(Uuid::new_v4()))));
        assert!(!is_plain_employee(&user(Role::Employee, None)));
        // A manager who is also on the payroll is not "plain"
        assert!(!is_plain_employee(&user(Role::Manager, Some(Uuid::new_v4()))));
    }
}
