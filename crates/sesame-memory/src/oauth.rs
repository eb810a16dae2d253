//! Fixture-backed OAuth collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use sesame_core::error::{NotFoundError, ProviderError, UpstreamError};
use sesame_core::traits::{OAuthUserResolver, ResourceOwner, UserInfo};
use sesame_core::{AccessToken, Identity, ProviderName, Result};
use tracing::debug;

/// A provider answering from a fixed token table.
///
/// States registered with [`with_state`](Self::with_state) are single use:
/// a successful check consumes them.
pub struct StaticResourceOwner {
    name: ProviderName,
    identifier_field: String,
    users: HashMap<String, Value>,
    states: Mutex<HashSet<String>>,
    fetches: AtomicUsize,
}

impl StaticResourceOwner {
    pub fn new(name: ProviderName) -> Self {
        Self {
            name,
            identifier_field: "id".to_string(),
            users: HashMap::new(),
            states: Mutex::new(HashSet::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Answer `access_token` with `payload`.
    pub fn with_user(mut self, access_token: impl Into<String>, payload: Value) -> Self {
        self.users.insert(access_token.into(), payload);
        self
    }

    pub fn with_state(self, state: impl Into<String>) -> Self {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state.into());
        self
    }

    /// Payload field holding the provider-side user id. Defaults to `id`.
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }

    /// Number of user-information fetches so far.
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceOwner for StaticResourceOwner {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    async fn user_information(&self, access_token: &AccessToken) -> Result<UserInfo> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let payload = self.users.get(access_token.as_str()).ok_or_else(|| {
            UpstreamError::Provider(ProviderError::new(
                self.name.as_str(),
                401,
                Some("invalid access token".to_string()),
            ))
        })?;

        let identifier = match payload.get(&self.identifier_field) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                return Err(UpstreamError::MalformedResponse {
                    provider: self.name.to_string(),
                    message: format!("missing \"{}\" field", self.identifier_field),
                }
                .into());
            }
        };

        debug!(provider = %self.name, %identifier, "Resolved access token");
        Ok(UserInfo::new(self.name.clone(), identifier, payload.clone()))
    }

    fn is_state_valid(&self, state: &str) -> bool {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(state)
    }
}

/// Maps provider identities to local users.
#[derive(Default)]
pub struct FixtureUserResolver {
    users: HashMap<(ProviderName, String), Identity>,
    lookups: AtomicUsize,
}

impl FixtureUserResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        mut self,
        provider: ProviderName,
        identifier: impl Into<String>,
        identity: Identity,
    ) -> Self {
        self.users.insert((provider, identifier.into()), identity);
        self
    }

    /// Number of lookups so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthUserResolver for FixtureUserResolver {
    async fn load_user(&self, info: &UserInfo) -> Result<Identity> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        self.users
            .get(&(info.provider().clone(), info.identifier().to_string()))
            .cloned()
            .ok_or_else(|| {
                NotFoundError::User {
                    provider: info.provider().to_string(),
                    identifier: info.identifier().to_string(),
                }
                .into()
            })
    }
}
