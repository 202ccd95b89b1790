use crate::model::role::Role;
use crate::service::attendance::ScanScope;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Caller identity, placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// Kiosks may read the directory to render codes; employees may not.
    pub fn require_staff_or_kiosk(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr | Role::System) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin/kiosk only"))
        }
    }

    /// HR and admins see everyone; an employee only sees themselves.
    pub fn require_self_or_hr(&self, employee_id: u64) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Not allowed to view this employee"))
        }
    }

    /// Employees record only their own scans; kiosks and staff record anyone's.
    pub fn scan_scope(&self) -> actix_web::Result<ScanScope> {
        match self.role {
            Role::Admin | Role::Hr | Role::System => Ok(ScanScope::AnyEmployee),
            Role::Employee => self
                .employee_id
                .map(ScanScope::OnlyEmployee)
                .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "u".to_string(),
            role,
            employee_id,
        }
    }

    #[test]
    fn scan_scope_by_role() {
        assert_eq!(
            user(Role::System, None).scan_scope().unwrap(),
            ScanScope::AnyEmployee
        );
        assert_eq!(
            user(Role::Employee, Some(7)).scan_scope().unwrap(),
            ScanScope::OnlyEmployee(7)
        );
        assert!(user(Role::Employee, None).scan_scope().is_err());
    }

    #[test]
    fn employees_only_see_their_own_history() {
        assert!(user(Role::Employee, Some(7)).require_self_or_hr(7).is_ok());
        assert!(user(Role::Employee, Some(7)).require_self_or_hr(8).is_err());
        assert!(user(Role::Hr, None).require_self_or_hr(8).is_ok());
        assert!(user(Role::System, None).require_self_or_hr(8).is_err());
    }
}
