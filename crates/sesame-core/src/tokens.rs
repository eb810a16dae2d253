//! Secret-bearing values.

use std::fmt;

use serde::Deserialize;

use crate::Result;
use crate::error::InvalidInputError;

/// A credential secret (password hash, cookie value, token).
///
/// # Security
///
/// Never logged or displayed in Debug output, and never serialized.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw secret.
    ///
    /// # Security
    ///
    /// Use only when handing the value to the component that consumes it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Hide secret value in Debug output
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

/// An OAuth access token handed back by a provider.
///
/// Providers answer either with a bare token string or with a token
/// response object (`access_token`, `refresh_token`, `expires_in`, ...).
/// Both shapes are accepted by [`AccessToken::from_response`].
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct AccessToken {
    token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    raw: Option<serde_json::Value>,
}

impl AccessToken {
    /// Create an access token from a bare token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            expires_in: None,
            raw: None,
        }
    }

    /// Create an access token from a provider token response.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither a non-empty string nor an
    /// object carrying a string `access_token` field.
    pub fn from_response(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(token) if !token.is_empty() => Ok(Self::new(token)),
            serde_json::Value::Object(ref fields) => {
                let token = fields
                    .get("access_token")
                    .and_then(|v| v.as_str())
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| InvalidInputError::AccessToken {
                        reason: "response has no access_token".to_string(),
                    })?
                    .to_string();

                let refresh_token = fields
                    .get("refresh_token")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                let expires_in = fields.get("expires_in").and_then(|v| v.as_u64());

                Ok(Self {
                    token,
                    refresh_token,
                    expires_in,
                    raw: Some(value),
                })
            }
            _ => Err(InvalidInputError::AccessToken {
                reason: "expected a token string or a token response object".to_string(),
            }
            .into()),
        }
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing requests to the provider.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Returns the refresh token, if the provider issued one.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns the token lifetime in seconds, if known.
    pub fn expires_in(&self) -> Option<u64> {
        self.expires_in
    }

    /// Returns the full token response, if the token was built from one.
    pub fn raw(&self) -> Option<&serde_json::Value> {
        self.raw.as_ref()
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}
