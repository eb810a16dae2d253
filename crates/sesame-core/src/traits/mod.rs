//! Boundary traits for the collaborators a login depends on.

mod checker;
mod events;
mod oauth;
mod remember;
mod session;
mod storage;

pub use checker::UserChecker;
pub use events::EventPublisher;
pub use oauth::{OAuthUserResolver, ResourceOwner, ResourceOwnerMap, UserInfo};
pub use remember::{CookieRememberMe, RememberMe, RememberMeToken, TokenRememberMe};
pub use session::SessionStrategy;
pub use storage::TokenStorage;
