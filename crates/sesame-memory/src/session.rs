//! Session fixation strategies.

use sesame_core::traits::SessionStrategy;
use sesame_core::{Credential, RequestContext, Result, SessionId};
use tracing::debug;

/// What happens to the session when a user authenticates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionFixation {
    /// Issue a new session id and keep the attributes.
    #[default]
    Migrate,
    /// Issue a new session id and drop every attribute.
    Invalidate,
    /// Leave the session alone.
    None,
}

impl SessionStrategy for SessionFixation {
    fn on_authentication(
        &self,
        request: &mut RequestContext,
        credential: &Credential,
    ) -> Result<()> {
        let session = request.session_mut();
        match self {
            SessionFixation::Migrate => {
                let previous = session.set_id(SessionId::generate());
                debug!(%previous, current = %session.id(), "Session migrated");
            }
            SessionFixation::Invalidate => {
                session.clear();
                let previous = session.set_id(SessionId::generate());
                debug!(%previous, current = %session.id(), "Session invalidated");
            }
            SessionFixation::None => {
                debug!(user = credential.identity().username(), "Session left unchanged");
            }
        }
        Ok(())
    }
}
