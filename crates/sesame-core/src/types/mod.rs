//! Core identity and naming types.
//!
//! Names are validated at construction time, so a realm or provider name
//! that made it into a credential is always well formed.

mod identity;
mod provider;
mod realm;

pub use identity::{AccountStatus, Identity, Role};
pub use provider::ProviderName;
pub use realm::RealmName;
