//! Account eligibility checks.

use std::sync::Arc;

use crate::Result;
use crate::error::{AccountStatusError, Error};
use crate::traits::UserChecker;
use crate::types::Identity;

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    Rejected(AccountStatusError),
}

/// Runs the pre- and post-authentication checks of a [`UserChecker`].
///
/// Status rejections become [`Eligibility::Rejected`]; any other checker
/// error is returned as an error.
#[derive(Clone)]
pub struct AccountGate {
    checker: Arc<dyn UserChecker>,
}

impl AccountGate {
    pub fn new(checker: Arc<dyn UserChecker>) -> Self {
        Self { checker }
    }

    pub fn check_eligible(&self, identity: &Identity) -> Result<Eligibility> {
        let checked = self
            .checker
            .check_pre_auth(identity)
            .and_then(|()| self.checker.check_post_auth(identity));

        match checked {
            Ok(()) => Ok(Eligibility::Eligible),
            Err(Error::AccountStatus(reason)) => Ok(Eligibility::Rejected(reason)),
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for AccountGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountGate").finish_non_exhaustive()
    }
}

/// User checker driven by the identity's own status flags.
///
/// Pre-auth rejects locked, then disabled, then expired accounts.
/// Post-auth rejects expired credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusUserChecker;

impl UserChecker for StatusUserChecker {
    fn check_pre_auth(&self, identity: &Identity) -> Result<()> {
        let status = identity.status();
        if status.locked {
            return Err(AccountStatusError::Locked.into());
        }
        if status.disabled {
            return Err(AccountStatusError::Disabled.into());
        }
        if status.expired {
            return Err(AccountStatusError::Expired.into());
        }
        Ok(())
    }

    fn check_post_auth(&self, identity: &Identity) -> Result<()> {
        if identity.status().credentials_expired {
            return Err(AccountStatusError::CredentialsExpired.into());
        }
        Ok(())
    }
}
