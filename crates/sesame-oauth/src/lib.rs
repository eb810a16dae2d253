//! sesame-oauth - OAuth resource owners backed by HTTP user-info endpoints.
//!
//! [`HttpResourceOwner`] exchanges an access token for the provider's
//! user information. Anti-forgery states issued during the authorization
//! redirect are kept in a [`StateStore`] shared with the owner that later
//! validates them.

mod error;
mod owner;
mod state;

pub use owner::{DEFAULT_TIMEOUT, HttpResourceOwner};
pub use state::{DEFAULT_STATE_TTL_SECS, StateStore};
