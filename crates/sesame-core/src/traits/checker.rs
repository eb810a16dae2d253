//! Account status checks.

use crate::Result;
use crate::types::Identity;

/// Decides whether an identity may log in.
///
/// Implementations reject with [`AccountStatusError`](crate::error::AccountStatusError)
/// for locked, disabled or expired accounts. Any other error is treated as
/// a failure of the checker itself.
pub trait UserChecker: Send + Sync {
    /// Checks run before credentials are considered.
    fn check_pre_auth(&self, identity: &Identity) -> Result<()>;

    /// Checks run after credentials are considered.
    fn check_post_auth(&self, identity: &Identity) -> Result<()>;
}
