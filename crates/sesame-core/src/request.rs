//! Request, session and response carriers.
//!
//! These are the per-call values the login manager works on. They are
//! plain data: the web framework fills a [`RequestContext`] from its own
//! request and copies the [`OutgoingResponse`] cookies back afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::tokens::Secret;

/// An opaque session identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-side session state attached to a request.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    attributes: BTreeMap<String, serde_json::Value>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Replace the session identifier and return the previous one.
    pub fn set_id(&mut self, id: SessionId) -> SessionId {
        std::mem::replace(&mut self.id, id)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.attributes.remove(key)
    }

    pub fn clear(&mut self) {
        self.attributes.clear();
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionId::generate())
    }
}

/// The inbound request a login happens in.
#[derive(Debug, Clone)]
pub struct RequestContext {
    id: Uuid,
    path: String,
    client_ip: Option<IpAddr>,
    received_at: DateTime<Utc>,
    session: Session,
}

impl RequestContext {
    /// Create a request context with a fresh session.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_session(path, Session::default())
    }

    pub fn with_session(path: impl Into<String>, session: Session) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            client_ip: None,
            received_at: Utc::now(),
            session,
        }
    }

    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Returns the request identifier, used to correlate log lines and events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}

/// A cookie to be set on the outgoing response.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: Secret,
    pub path: String,
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
}

impl Cookie {
    /// An HTTP-only, secure cookie scoped to `/`.
    pub fn new(name: impl Into<String>, value: Secret) -> Self {
        Self {
            name: name.into(),
            value,
            path: "/".to_string(),
            expires: None,
            http_only: true,
            secure: true,
        }
    }

    pub fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }
}

// Cookie values are secrets
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("path", &self.path)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Handle on the response being built; receives remember-me cookies.
#[derive(Debug, Clone, Default)]
pub struct OutgoingResponse {
    cookies: Vec<Cookie>,
}

impl OutgoingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie, replacing any earlier cookie with the same name.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.cookies.retain(|c| c.name != cookie.name);
        self.cookies.push(cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }
}
