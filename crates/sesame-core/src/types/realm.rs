//! Realm (firewall) name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// A validated realm name.
///
/// A realm is a named protected area of the application with its own
/// authentication rules (a firewall). Names are ASCII letters, digits,
/// `_`, `-` and `.`.
///
/// # Example
///
/// ```
/// use sesame_core::RealmName;
///
/// let realm = RealmName::new("main").unwrap();
/// assert_eq!(realm.as_str(), "main");
/// assert!(RealmName::new("two words").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RealmName(String);

impl RealmName {
    /// Create a new realm name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains other characters
    /// than ASCII alphanumerics, `_`, `-` and `.`.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the realm name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        if s.is_empty() {
            return Err(InvalidInputError::RealmName {
                value: s.to_string(),
                reason: "must be non-empty".to_string(),
            }
            .into());
        }

        if let Some(c) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(InvalidInputError::RealmName {
                value: s.to_string(),
                reason: format!("invalid character '{}'", c),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for RealmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RealmName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RealmName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RealmName> for String {
    fn from(realm: RealmName) -> Self {
        realm.0
    }
}

impl AsRef<str> for RealmName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
