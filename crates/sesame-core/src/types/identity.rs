//! The authenticated principal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};
use crate::tokens::Secret;

/// A validated role such as `ROLE_ADMIN`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Create a new role, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is empty or contains whitespace.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(InvalidInputError::Role {
                value: s,
                reason: "must be non-empty without whitespace".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the role string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Role {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

/// Account status flags as reported by the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountStatus {
    pub locked: bool,
    pub disabled: bool,
    pub expired: bool,
    pub credentials_expired: bool,
}

impl AccountStatus {
    /// Returns true if no status flag is raised.
    pub fn is_active(&self) -> bool {
        !(self.locked || self.disabled || self.expired || self.credentials_expired)
    }
}

/// An already-verified user identity.
///
/// Owned by the external identity provider; login code only reads it.
/// The password, if present, is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    username: String,
    #[serde(default)]
    roles: Vec<Role>,
    #[serde(default, skip_serializing)]
    password: Option<Secret>,
    #[serde(default)]
    status: AccountStatus,
}

impl Identity {
    /// Create an identity with no roles, no secret and an active account.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: Vec::new(),
            password: None,
            status: AccountStatus::default(),
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_password(mut self, password: Secret) -> Self {
        self.password = Some(password);
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the opaque user identifier.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns the credential secret, if the provider exposes one.
    pub fn password(&self) -> Option<&Secret> {
        self.password.as_ref()
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_validation() {
        assert!(Role::new("ROLE_USER").is_ok());
        assert!(Role::new("").is_err());
        assert!(Role::new("ROLE USER").is_err());
    }

    #[test]
    fn identity_password_is_not_serialized() {
        let identity = Identity::new("alice")
            .with_roles([Role::new("ROLE_USER").unwrap()])
            .with_password(Secret::new("$2y$13$hash"));

        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("alice"));
        assert!(json.contains("ROLE_USER"));
        assert!(!json.contains("$2y$13$hash"));
    }

    #[test]
    fn identity_deserializes_with_defaults() {
        let identity: Identity = serde_json::from_str(
            r#"{"username": "bob", "password": "pw", "status": {"locked": true}}"#,
        )
        .unwrap();

        assert_eq!(identity.username(), "bob");
        assert!(identity.roles().is_empty());
        assert_eq!(identity.password().map(Secret::expose), Some("pw"));
        assert!(identity.status().locked);
        assert!(!identity.status().disabled);
        assert!(!identity.status().is_active());
    }
}
