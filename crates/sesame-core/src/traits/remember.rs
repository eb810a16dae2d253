//! Remember-me (durable login) services.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::credential::Credential;
use crate::request::{Cookie, OutgoingResponse, RequestContext};
use crate::tokens::Secret;
use crate::types::Identity;

/// Remember-me service that writes its artifact onto the response itself.
#[async_trait]
pub trait CookieRememberMe: Send + Sync {
    async fn login_success(
        &self,
        request: &RequestContext,
        response: &mut OutgoingResponse,
        credential: &Credential,
    ) -> Result<()>;
}

/// Remember-me service that only mints a token for an identity.
#[async_trait]
pub trait TokenRememberMe: Send + Sync {
    async fn issue(&self, identity: &Identity) -> Result<RememberMeToken>;
}

/// A minted remember-me token, ready to be sent as a cookie.
#[derive(Debug, Clone)]
pub struct RememberMeToken {
    pub cookie_name: String,
    pub value: Secret,
    pub expires_at: DateTime<Utc>,
}

impl RememberMeToken {
    pub fn into_cookie(self) -> Cookie {
        Cookie::new(self.cookie_name, self.value).with_expires(self.expires_at)
    }
}

/// The remember-me service of a realm, in one of its two shapes.
#[derive(Clone)]
pub enum RememberMe {
    Cookie(Arc<dyn CookieRememberMe>),
    Token(Arc<dyn TokenRememberMe>),
}

impl RememberMe {
    /// Issue the durable-login artifact for `credential` onto `response`.
    pub async fn issue(
        &self,
        request: &RequestContext,
        response: &mut OutgoingResponse,
        credential: &Credential,
    ) -> Result<()> {
        match self {
            RememberMe::Cookie(service) => {
                service.login_success(request, response, credential).await
            }
            RememberMe::Token(service) => {
                let token = service.issue(credential.identity()).await?;
                response.set_cookie(token.into_cookie());
                Ok(())
            }
        }
    }
}

impl fmt::Debug for RememberMe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RememberMe::Cookie(_) => f.write_str("RememberMe::Cookie"),
            RememberMe::Token(_) => f.write_str("RememberMe::Token"),
        }
    }
}
