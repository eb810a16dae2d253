//! Resource owner talking to a provider's user-info endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use sesame_core::error::{ConfigurationError, InvalidInputError, UpstreamError};
use sesame_core::traits::{ResourceOwner, UserInfo};
use sesame_core::{AccessToken, ProviderName, Result};
use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::{provider_error, transport_error};
use crate::state::StateStore;

/// Request timeout used by [`HttpResourceOwner::new`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// An OAuth provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpResourceOwner {
    name: ProviderName,
    user_info_url: Url,
    identifier_field: String,
    states: Arc<StateStore>,
    client: reqwest::Client,
}

impl HttpResourceOwner {
    /// Create a resource owner for `name` fetching from `user_info_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client
    /// cannot be built.
    pub fn new(name: ProviderName, user_info_url: Url) -> Result<Self> {
        Self::with_timeout(name, user_info_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        name: ProviderName,
        user_info_url: Url,
        timeout: Duration,
    ) -> Result<Self> {
        if !matches!(user_info_url.scheme(), "http" | "https") {
            return Err(InvalidInputError::Other {
                message: format!(
                    "user-info URL for {} must be http or https, got {}",
                    name,
                    user_info_url.scheme()
                ),
            }
            .into());
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("sesame/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            name,
            user_info_url,
            identifier_field: "id".to_string(),
            states: Arc::new(StateStore::new()),
            client,
        })
    }

    /// Payload field holding the provider-side user id.
    ///
    /// A value starting with `/` is a JSON pointer (`/data/id`), anything
    /// else a top-level key. Defaults to `id`.
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = field.into();
        self
    }

    /// Share a state store with the code issuing authorization redirects.
    pub fn with_states(mut self, states: Arc<StateStore>) -> Self {
        self.states = states;
        self
    }

    pub fn states(&self) -> &Arc<StateStore> {
        &self.states
    }

    pub fn user_info_url(&self) -> &Url {
        &self.user_info_url
    }

    fn identifier(&self, payload: &Value) -> Option<String> {
        let value = if self.identifier_field.starts_with('/') {
            payload.pointer(&self.identifier_field)
        } else {
            payload.get(&self.identifier_field)
        };

        match value {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[async_trait]
impl ResourceOwner for HttpResourceOwner {
    fn name(&self) -> &ProviderName {
        &self.name
    }

    #[instrument(skip(self, access_token), fields(provider = %self.name))]
    async fn user_information(&self, access_token: &AccessToken) -> Result<UserInfo> {
        debug!(url = %self.user_info_url, "Fetching user information");

        let response = self
            .client
            .get(self.user_info_url.clone())
            .bearer_auth(access_token.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(self.name.as_str(), e))?;

        let status = response.status();
        trace!(%status, "User-info response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(provider_error(self.name.as_str(), status.as_u16(), &body).into());
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| transport_error(self.name.as_str(), e))?;

        let identifier = self.identifier(&payload).ok_or_else(|| {
            UpstreamError::MalformedResponse {
                provider: self.name.to_string(),
                message: format!("missing \"{}\" in user information", self.identifier_field),
            }
        })?;

        debug!(%identifier, "Fetched user information");
        Ok(UserInfo::new(self.name.clone(), identifier, payload))
    }

    fn is_state_valid(&self, state: &str) -> bool {
        self.states.validate(state)
    }
}
