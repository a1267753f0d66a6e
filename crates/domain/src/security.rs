use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rentdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Permission code that stands for full access.
pub const ALL_PERMISSION_CODE: &str = "ALL";

/// Stable backend identifier of a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a role identifier from its backend value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Returns the identifier as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Stable backend identifier of a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a permission identifier from its backend value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        Ok(Self(NonEmptyString::new(value)?.into()))
    }

    /// Returns the identifier as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Role that permissions are granted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
}

impl Role {
    /// Creates a validated role.
    pub fn new(id: RoleId, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Grantable permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    code: NonEmptyString,
    description: Option<String>,
}

impl Permission {
    /// Creates a validated permission.
    pub fn new(
        id: PermissionId,
        code: impl Into<String>,
        description: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            code: NonEmptyString::new(code)?,
            description: description.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            }),
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> &PermissionId {
        &self.id
    }

    /// Returns the stable permission code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the optional human-readable description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether this is the full-access sentinel.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.code.as_str() == ALL_PERMISSION_CODE
    }
}

/// Application roles that scope dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppRole {
    /// Platform administrator.
    Admin,
    /// Property owner.
    Owner,
    /// Renting tenant.
    Tenant,
}

impl AppRole {
    /// Returns the role name carried by tokens and role records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Owner => "OWNER",
            Self::Tenant => "TENANT",
        }
    }
}

impl FromStr for AppRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        match normalized.strip_prefix("ROLE_").unwrap_or(normalized.as_str()) {
            "ADMIN" => Ok(Self::Admin),
            "OWNER" => Ok(Self::Owner),
            "TENANT" => Ok(Self::Tenant),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{AppRole, Permission, PermissionId, RoleId};

    #[test]
    fn app_role_accepts_prefixed_names() {
        assert_eq!(AppRole::from_str("ROLE_owner").ok(), Some(AppRole::Owner));
        assert!(AppRole::from_str("janitor").is_err());
    }

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(RoleId::new(" ").is_err());
        assert!(PermissionId::new("").is_err());
    }

    #[test]
    fn all_sentinel_is_detected_by_code() {
        let permission = PermissionId::new("1")
            .and_then(|id| Permission::new(id, "ALL", Some("  ".to_owned())));
        assert!(permission.is_ok());
        let permission = permission.unwrap_or_else(|_| unreachable!());
        assert!(permission.is_all());
        assert_eq!(permission.description(), None);
    }
}
