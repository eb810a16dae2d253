//! In-memory credential storage.

use std::sync::{PoisonError, RwLock};

use sesame_core::Credential;
use sesame_core::traits::TokenStorage;
use tracing::debug;

/// Token storage holding a single credential behind a lock.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    credential: RwLock<Option<Credential>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }

    /// Remove the active credential, returning it.
    pub fn clear(&self) -> Option<Credential> {
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn set_credential(&self, credential: Credential) {
        debug!(
            user = credential.identity().username(),
            realm = %credential.realm(),
            "Storing credential"
        );
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credential);
    }

    fn credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
