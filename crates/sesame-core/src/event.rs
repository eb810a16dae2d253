//! Interactive-login notification.

use chrono::{DateTime, Utc};

use crate::credential::Credential;
use crate::request::RequestContext;

/// Name under which interactive logins are published.
pub const INTERACTIVE_LOGIN: &str = "security.interactive_login";

/// Published after a login triggered directly by the user.
///
/// Listeners (audit logging, analytics, onboarding) receive the request
/// the login happened in and the credential that was installed.
#[derive(Debug, Clone, Copy)]
pub struct InteractiveLogin<'a> {
    request: &'a RequestContext,
    credential: &'a Credential,
    occurred_at: DateTime<Utc>,
}

impl<'a> InteractiveLogin<'a> {
    pub fn new(request: &'a RequestContext, credential: &'a Credential) -> Self {
        Self {
            request,
            credential,
            occurred_at: Utc::now(),
        }
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }

    pub fn credential(&self) -> &'a Credential {
        self.credential
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
