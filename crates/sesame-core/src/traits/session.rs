//! Session fixation protection.

use crate::Result;
use crate::credential::Credential;
use crate::request::RequestContext;

/// Binds a session to a freshly installed credential.
///
/// Typical strategies migrate the session to a new identifier or
/// invalidate it entirely; a strategy may also decide nothing needs to
/// change.
pub trait SessionStrategy: Send + Sync {
    fn on_authentication(
        &self,
        request: &mut RequestContext,
        credential: &Credential,
    ) -> Result<()>;
}
