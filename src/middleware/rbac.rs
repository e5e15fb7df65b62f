// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// A role requirement a route can demand.
pub trait RoleCheck: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
    fn describe() -> &'static str;
}

/// Extractor guarding a handler behind a role requirement. Runs after
/// `auth_guard` has stored the user in the request extensions.
pub struct RequireRole<T>(PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleCheck,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "this action requires {}",
                T::describe()
            )));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// ROLE REQUIREMENTS
// ---

/// Disbursement, commission payout and RTO management.
pub struct AdminLevel;
impl RoleCheck for AdminLevel {
    fn allows(role: UserRole) -> bool {
        role.is_admin_level()
    }
    fn describe() -> &'static str {
        "an admin role"
    }
}

/// Document verification.
pub struct OperatorLevel;
impl RoleCheck for OperatorLevel {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Operator) || role.is_admin_level()
    }
    fn describe() -> &'static str {
        "an operator role"
    }
}

/// Approval decisions.
pub struct BankerLevel;
impl RoleCheck for BankerLevel {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Banker) || role.is_admin_level()
    }
    fn describe() -> &'static str {
        "a banker role"
    }
}

/// Application submission.
pub struct ConnectorLevel;
impl RoleCheck for ConnectorLevel {
    fn allows(role: UserRole) -> bool {
        matches!(role, UserRole::Connector)
    }
    fn describe() -> &'static str {
        "a connector role"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_level_accepts_both_admin_roles_only() {
        assert!(AdminLevel::allows(UserRole::Admin));
        assert!(AdminLevel::allows(UserRole::SuperAdmin));
        assert!(!AdminLevel::allows(UserRole::Banker));
        assert!(!AdminLevel::allows(UserRole::Operator));
        assert!(!AdminLevel::allows(UserRole::Connector));
    }

    #[test]
    fn staff_levels_include_admins() {
        assert!(OperatorLevel::allows(UserRole::Operator));
        assert!(OperatorLevel::allows(UserRole::Admin));
        assert!(!OperatorLevel::allows(UserRole::Connector));

        assert!(BankerLevel::allows(UserRole::Banker));
        assert!(BankerLevel::allows(UserRole::SuperAdmin));
        assert!(!BankerLevel::allows(UserRole::Operator));
    }

    #[test]
    fn connector_level_is_exclusive() {
        assert!(ConnectorLevel::allows(UserRole::Connector));
        assert!(!ConnectorLevel::allows(UserRole::Admin));
    }
}
