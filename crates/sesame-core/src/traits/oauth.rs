//! OAuth provider and user resolution traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::error::NotFoundError;
use crate::tokens::AccessToken;
use crate::types::{Identity, ProviderName};

/// User information returned by a provider for an access token.
#[derive(Debug, Clone)]
pub struct UserInfo {
    provider: ProviderName,
    identifier: String,
    payload: serde_json::Value,
}

impl UserInfo {
    pub fn new(
        provider: ProviderName,
        identifier: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            provider,
            identifier: identifier.into(),
            payload,
        }
    }

    pub fn provider(&self) -> &ProviderName {
        &self.provider
    }

    /// Returns the provider-side user identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the raw user-information payload.
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Returns a string field of the payload, if present.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(|v| v.as_str())
    }
}

/// An OAuth provider (resource owner).
#[async_trait]
pub trait ResourceOwner: Send + Sync {
    fn name(&self) -> &ProviderName;

    /// Fetch user information for an access token.
    async fn user_information(&self, access_token: &AccessToken) -> Result<UserInfo>;

    /// Check an anti-forgery state value against what this provider issued.
    fn is_state_valid(&self, state: &str) -> bool;
}

/// The resource owners configured for a realm.
pub trait ResourceOwnerMap: Send + Sync {
    /// Look up a resource owner by name.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::ResourceOwner`] for unknown names.
    fn resource_owner(&self, name: &str) -> Result<Arc<dyn ResourceOwner>>;
}

impl ResourceOwnerMap for HashMap<String, Arc<dyn ResourceOwner>> {
    fn resource_owner(&self, name: &str) -> Result<Arc<dyn ResourceOwner>> {
        self.get(name).cloned().ok_or_else(|| {
            NotFoundError::ResourceOwner {
                name: name.to_string(),
            }
            .into()
        })
    }
}

/// Maps provider user information onto a local identity.
#[async_trait]
pub trait OAuthUserResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`NotFoundError::User`] when no local user matches.
    async fn load_user(&self, user_info: &UserInfo) -> Result<Identity>;
}
