//! Silent login straight into a session attribute.
//!
//! Unlike [`LoginManager`](crate::LoginManager), this skips token storage,
//! account checks and fixation protection: it writes the serialized
//! credential where the session firewall of `context` will pick it up on
//! the next request, then publishes the interactive-login event.
//!
//! The credential is a standard one without the identity's secret, so the
//! stored attribute and the published event carry the same data.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::error::InvalidInputError;
use crate::event::{INTERACTIVE_LOGIN, InteractiveLogin};
use crate::factory::CredentialFactory;
use crate::request::RequestContext;
use crate::traits::EventPublisher;
use crate::types::{Identity, RealmName};

/// Prefix of the session attribute holding a context's credential.
pub const SECURITY_SESSION_PREFIX: &str = "_security_";

/// Returns the session attribute key for a firewall context.
pub fn session_key(context: &RealmName) -> String {
    format!("{}{}", SECURITY_SESSION_PREFIX, context)
}

pub struct SilentLogin {
    events: Arc<dyn EventPublisher>,
}

impl SilentLogin {
    pub fn new(events: Arc<dyn EventPublisher>) -> Self {
        Self { events }
    }

    /// Log `identity` into firewall `realm`, storing the credential under
    /// the session key of `context`. Does nothing without a request.
    #[instrument(skip(self, request, identity), fields(user = %identity.username(), %realm, %context))]
    pub fn login(
        &self,
        request: Option<&mut RequestContext>,
        identity: &Identity,
        realm: &RealmName,
        context: &RealmName,
    ) -> Result<()> {
        let Some(request) = request else {
            debug!("No active request, nothing to do");
            return Ok(());
        };

        let credential = CredentialFactory::new(realm.clone()).username_password(identity);

        let serialized = serde_json::to_value(&credential).map_err(|e| InvalidInputError::Other {
            message: format!("failed to serialize credential: {}", e),
        })?;
        request.session_mut().insert(session_key(context), serialized);

        self.events.publish(INTERACTIVE_LOGIN, &InteractiveLogin::new(request, &credential));

        debug!("Credential written to session");
        Ok(())
    }
}
