//! Credential storage trait.

use crate::credential::Credential;

/// Session-scoped storage holding the single active credential.
///
/// Callers guarantee one writer per request; implementations need not
/// coordinate concurrent logins for the same session.
pub trait TokenStorage: Send + Sync {
    /// Install a credential, replacing whatever was there.
    fn set_credential(&self, credential: Credential);

    /// Returns the active credential, if any.
    fn credential(&self) -> Option<Credential>;
}
