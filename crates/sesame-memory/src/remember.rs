//! Remember-me services.
//!
//! [`SimpleHashRememberMe`] signs a self-contained cookie with a server
//! secret. [`PersistentTokenRememberMe`] mints a random series and token
//! pair and keeps it server-side, so each cookie can be revoked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use sesame_core::traits::{CookieRememberMe, RememberMeToken, TokenRememberMe};
use sesame_core::{Cookie, Credential, Identity, OutgoingResponse, RequestContext, Result, Secret};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;

/// Default cookie name for remember-me artifacts.
pub const REMEMBER_ME_COOKIE: &str = "REMEMBERME";

/// Default lifetime of a remember-me cookie.
const DEFAULT_LIFETIME_DAYS: i64 = 365;

/// Signed-cookie remember-me.
///
/// The cookie value is `base64(username:expires:signature)` where the
/// signature is a SHA-256 over the username, the expiry timestamp and the
/// server secret.
pub struct SimpleHashRememberMe {
    secret: Secret,
    cookie_name: String,
    lifetime: Duration,
    issued: AtomicUsize,
}

impl SimpleHashRememberMe {
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            cookie_name: REMEMBER_ME_COOKIE.to_string(),
            lifetime: Duration::days(DEFAULT_LIFETIME_DAYS),
            issued: AtomicUsize::new(0),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Number of cookies issued so far.
    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    fn signature(&self, username: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(username.as_bytes());
        hasher.update(b":");
        hasher.update(expires.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(self.secret.expose().as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    fn encode(&self, username: &str, expires: i64) -> String {
        let signature = self.signature(username, expires);
        URL_SAFE_NO_PAD.encode(format!("{}:{}:{}", username, expires, signature))
    }

    /// Check a cookie value, returning the username it was issued for.
    ///
    /// Returns `None` for malformed, tampered or expired values.
    pub fn verify(&self, value: &str, now: DateTime<Utc>) -> Option<String> {
        let decoded = URL_SAFE_NO_PAD.decode(value).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;

        // Usernames may contain ':', so split from the right.
        let mut parts = decoded.rsplitn(3, ':');
        let signature = parts.next()?;
        let expires: i64 = parts.next()?.parse().ok()?;
        let username = parts.next()?;

        let expected = self.signature(username, expires);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return None;
        }
        if expires <= now.timestamp() {
            return None;
        }
        Some(username.to_string())
    }
}

#[async_trait]
impl CookieRememberMe for SimpleHashRememberMe {
    async fn login_success(
        &self,
        request: &RequestContext,
        response: &mut OutgoingResponse,
        credential: &Credential,
    ) -> Result<()> {
        let expires_at = Utc::now() + self.lifetime;
        let username = credential.identity().username();
        let value = self.encode(username, expires_at.timestamp());

        response.set_cookie(
            Cookie::new(self.cookie_name.clone(), Secret::new(value)).with_expires(expires_at),
        );
        self.issued.fetch_add(1, Ordering::SeqCst);

        debug!(user = username, request_id = %request.id(), "Remember-me cookie issued");
        Ok(())
    }
}

/// A server-side remember-me record.
#[derive(Debug, Clone)]
pub struct PersistentToken {
    pub username: String,
    pub series: String,
    pub token: Secret,
    pub last_used: DateTime<Utc>,
}

/// Series/token remember-me backed by an in-memory table.
pub struct PersistentTokenRememberMe {
    cookie_name: String,
    lifetime: Duration,
    tokens: Mutex<HashMap<String, PersistentToken>>,
}

impl Default for PersistentTokenRememberMe {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentTokenRememberMe {
    pub fn new() -> Self {
        Self {
            cookie_name: REMEMBER_ME_COOKIE.to_string(),
            lifetime: Duration::days(DEFAULT_LIFETIME_DAYS),
            tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Look up a record by series.
    pub fn token(&self, series: &str) -> Option<PersistentToken> {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(series)
            .cloned()
    }

    /// Number of live records for `username`.
    pub fn tokens_for(&self, username: &str) -> usize {
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|t| t.username == username)
            .count()
    }

    /// Drop every record of `username`, returning how many were removed.
    pub fn revoke_user(&self, username: &str) -> usize {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        let before = tokens.len();
        tokens.retain(|_, t| t.username != username);
        before - tokens.len()
    }

    /// Split a cookie value into its series and token.
    pub fn decode(value: &str) -> Option<(String, String)> {
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(value).ok()?).ok()?;
        let (series, token) = decoded.split_once(':')?;
        Some((series.to_string(), token.to_string()))
    }
}

#[async_trait]
impl TokenRememberMe for PersistentTokenRememberMe {
    async fn issue(&self, identity: &Identity) -> Result<RememberMeToken> {
        let series = Uuid::new_v4().simple().to_string();
        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();

        let value = URL_SAFE_NO_PAD.encode(format!("{}:{}", series, token));
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                series.clone(),
                PersistentToken {
                    username: identity.username().to_string(),
                    series: series.clone(),
                    token: Secret::new(token),
                    last_used: now,
                },
            );

        debug!(user = identity.username(), %series, "Persistent remember-me token issued");
        Ok(RememberMeToken {
            cookie_name: self.cookie_name.clone(),
            value: Secret::new(value),
            expires_at: now + self.lifetime,
        })
    }
}
