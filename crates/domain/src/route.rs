use serde::{Deserialize, Serialize};

use crate::security::AppRole;

/// Role-scoped dashboard areas of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dashboard {
    /// User, role and permission administration.
    Admin,
    /// House, room, asset and repair management.
    Owner,
    /// Contracts, invoices and repair requests of the tenant.
    Tenant,
}

impl Dashboard {
    /// Returns the role required to open the dashboard.
    #[must_use]
    pub fn required_role(&self) -> AppRole {
        match self {
            Self::Admin => AppRole::Admin,
            Self::Owner => AppRole::Owner,
            Self::Tenant => AppRole::Tenant,
        }
    }
}

/// Outcome of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session may open the route.
    Allowed,
    /// No usable session; send the user to the login page.
    RedirectToLogin,
    /// Signed in, but without the required role.
    Forbidden,
}

/// Decides whether a caller holding `roles` may open `dashboard`.
///
/// `roles` is `None` when there is no signed-in session.
#[must_use]
pub fn check_route(roles: Option<&[AppRole]>, dashboard: Dashboard) -> RouteDecision {
    match roles {
        None => RouteDecision::RedirectToLogin,
        Some(roles) if roles.contains(&dashboard.required_role()) => RouteDecision::Allowed,
        Some(_) => RouteDecision::Forbidden,
    }
}

#[cfg(test)]
mod tests {
    use super::{Dashboard, RouteDecision, check_route};
    use crate::security::AppRole;

    #[test]
    fn anonymous_callers_are_redirected() {
        assert_eq!(
            check_route(None, Dashboard::Admin),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn owner_cannot_open_admin_dashboard() {
        let roles = [AppRole::Owner];
        assert_eq!(
            check_route(Some(&roles), Dashboard::Admin),
            RouteDecision::Forbidden
        );
        assert_eq!(
            check_route(Some(&roles), Dashboard::Owner),
            RouteDecision::Allowed
        );
    }
}
