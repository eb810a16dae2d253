//! Login manager configuration.
//!
//! A configuration document names one manager per protected realm:
//!
//! ```json
//! {
//!   "managers": {
//!     "main": {
//!       "firewall_name": "main",
//!       "remember_me": true,
//!       "oauth": {
//!         "enabled": true,
//!         "user_provider": "app.oauth_users",
//!         "always_authenticated": true
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::ConfigurationError;
use crate::types::RealmName;

/// Which OAuth credential shape a realm issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthTokenKind {
    /// Plain OAuth credential; the always-authenticated override is ignored.
    Plain,
    /// OAuth credential bound to the realm that honours the override.
    #[default]
    RealmBound,
}

/// OAuth settings for one realm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OAuthConfig {
    pub enabled: bool,
    pub token_kind: OAuthTokenKind,
    pub always_authenticated: bool,
    /// Issue a username/password credential instead of an OAuth one.
    pub use_username_password_token: bool,
    /// Name of the OAuth-aware user resolver to use.
    pub user_provider: Option<String>,
}

/// Immutable per-realm settings handed to a [`LoginManager`](crate::LoginManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealmConfig {
    name: RealmName,
    remember_me: bool,
    oauth: OAuthConfig,
}

impl RealmConfig {
    /// Realm with remember-me and OAuth disabled.
    pub fn new(name: RealmName) -> Self {
        Self {
            name,
            remember_me: false,
            oauth: OAuthConfig::default(),
        }
    }

    pub fn with_remember_me(mut self, enabled: bool) -> Self {
        self.remember_me = enabled;
        self
    }

    pub fn with_oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = oauth;
        self
    }

    pub fn name(&self) -> &RealmName {
        &self.name
    }

    pub fn remember_me(&self) -> bool {
        self.remember_me
    }

    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }
}

/// Configuration of a single named manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerConfig {
    pub firewall_name: RealmName,
    #[serde(default)]
    pub remember_me: bool,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

impl ManagerConfig {
    /// Build the realm settings for this manager.
    pub fn realm(&self) -> RealmConfig {
        RealmConfig::new(self.firewall_name.clone())
            .with_remember_me(self.remember_me)
            .with_oauth(self.oauth.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.oauth.enabled
            && self
                .oauth
                .user_provider
                .as_deref()
                .is_none_or(|p| p.trim().is_empty())
        {
            return Err(ConfigurationError::MissingUserProvider {
                realm: self.firewall_name.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginConfig {
    #[serde(default)]
    pub managers: BTreeMap<String, ManagerConfig>,
}

impl LoginConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is malformed, names
    /// an invalid realm, or enables OAuth without a user provider.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| ConfigurationError::Invalid {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Invalid {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }

    /// Check every manager entry.
    pub fn validate(&self) -> Result<()> {
        for (name, manager) in &self.managers {
            if name.trim().is_empty() {
                return Err(ConfigurationError::Invalid {
                    message: "manager names must be non-empty".to_string(),
                }
                .into());
            }
            manager.validate()?;
        }
        Ok(())
    }
}
