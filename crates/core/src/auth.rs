use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity decoded from the bearer token of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    subject: String,
    roles: Vec<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionIdentity {
    /// Creates a session identity from decoded token claims.
    ///
    /// Role names are upper-cased, stripped of a `ROLE_` prefix and
    /// deduplicated.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        roles: impl IntoIterator<Item = String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut roles: Vec<String> = roles
            .into_iter()
            .map(|role| {
                let role = role.trim().to_uppercase();
                role.strip_prefix("ROLE_").map(str::to_owned).unwrap_or(role)
            })
            .filter(|role| !role.is_empty())
            .collect();
        roles.sort();
        roles.dedup();

        Self {
            subject: subject.into(),
            roles,
            expires_at,
        }
    }

    /// Returns the subject claim, usually the username.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns normalized role names carried by the token.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        self.roles.as_slice()
    }

    /// Returns whether the identity carries the role name.
    #[must_use]
    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles
            .iter()
            .any(|role| role.eq_ignore_ascii_case(role_name))
    }

    /// Returns the token expiry, if the token carried one.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whether the token is expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::SessionIdentity;

    #[test]
    fn roles_are_normalized() {
        let identity = SessionIdentity::new(
            "alice",
            vec![
                "owner".to_owned(),
                " ROLE_OWNER ".to_owned(),
                String::new(),
            ],
            None,
        );
        assert_eq!(identity.roles(), ["OWNER".to_owned()]);
        assert!(identity.has_role("Owner"));
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let identity = SessionIdentity::new("alice", Vec::new(), Some(now));
        assert!(identity.is_expired_at(now));
        assert!(!identity.is_expired_at(now - Duration::seconds(1)));
    }
}
