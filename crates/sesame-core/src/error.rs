//! Error types for sesame.
//!
//! One unified error type with explicit variants for configuration,
//! lookup, authentication, account status, upstream and input validation
//! failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for sesame operations.
///
/// [`Error::AccountStatus`] is special: the login manager swallows it and
/// returns normally without touching the session. Every other variant is
/// surfaced to the caller unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// The realm is not set up for the requested operation.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A provider, user or manager could not be found.
    #[error("not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Authentication failed (anti-forgery state mismatch).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The account is not eligible for login.
    #[error("account status: {0}")]
    AccountStatus(#[from] AccountStatusError),

    /// An external collaborator (provider, remember-me service) failed.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Input validation errors (realm, provider or role names).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// OAuth login was called on a realm that does not enable it.
    #[error("OAuth login called, but is not enabled for \"{realm}\"")]
    OAuthDisabled { realm: String },

    /// OAuth is enabled but the resource-owner map or user resolver is absent.
    #[error("OAuth is enabled for \"{realm}\" but its {missing} was not provided")]
    MissingOAuthService { realm: String, missing: String },

    /// OAuth is enabled but no user provider is named.
    #[error("OAuth is enabled for \"{realm}\" but no user_provider is configured")]
    MissingUserProvider { realm: String },

    /// The configuration document could not be read or parsed.
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Lookup failures.
#[derive(Debug, Error)]
pub enum NotFoundError {
    /// No resource owner is registered under this name.
    #[error("no resource owner named \"{name}\"")]
    ResourceOwner { name: String },

    /// The provider identity does not map to a local user.
    #[error("no local user for {provider} identity \"{identifier}\"")]
    User { provider: String, identifier: String },

    /// No login manager is registered under this name.
    #[error("no login manager named \"{name}\"")]
    Manager { name: String },
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The anti-forgery state did not match what the provider issued.
    #[error("invalid state parameter for {provider}")]
    InvalidState { provider: String },
}

/// Reasons an account may not log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccountStatusError {
    #[error("account is locked")]
    Locked,

    #[error("account is disabled")]
    Disabled,

    #[error("account has expired")]
    Expired,

    #[error("credentials have expired")]
    CredentialsExpired,
}

/// Errors reported by external collaborators.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection to the provider failed.
    #[error("connection to {provider} failed: {message}")]
    Connection { provider: String, message: String },

    /// The provider did not answer in time.
    #[error("request to {provider} timed out")]
    Timeout { provider: String },

    /// The provider answered with an error status.
    #[error("{0}")]
    Provider(ProviderError),

    /// The provider answered, but the payload was unusable.
    #[error("malformed response from {provider}: {message}")]
    MalformedResponse { provider: String, message: String },

    /// A service such as a remember-me store failed.
    #[error("{service} failed: {message}")]
    Service { service: String, message: String },
}

/// An error status returned by an OAuth provider.
#[derive(Debug)]
pub struct ProviderError {
    /// Provider name.
    pub provider: String,
    /// HTTP status code.
    pub status: u16,
    /// Error message from the provider, if any.
    pub message: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} returned HTTP {}", self.provider, self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Create a new provider error.
    pub fn new(provider: impl Into<String>, status: u16, message: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            status,
            message,
        }
    }

    /// Check if the provider rejected the access token.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid realm name.
    #[error("invalid realm name '{value}': {reason}")]
    RealmName { value: String, reason: String },

    /// Invalid provider name.
    #[error("invalid provider name '{value}': {reason}")]
    ProviderName { value: String, reason: String },

    /// Invalid role.
    #[error("invalid role '{value}': {reason}")]
    Role { value: String, reason: String },

    /// Unusable access token.
    #[error("invalid access token: {reason}")]
    AccessToken { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
