//! sesame-core - Login orchestration types, traits and helpers.
//!
//! Given an identity that has already been verified elsewhere, a
//! [`LoginManager`] installs a credential into session storage, binds the
//! session to the request, optionally issues a remember-me artifact and
//! publishes an interactive-login event.

pub mod config;
pub mod credential;
pub mod error;
pub mod event;
pub mod factory;
pub mod gate;
pub mod manager;
pub mod registry;
pub mod request;
pub mod silent;
pub mod tokens;
pub mod traits;
pub mod types;

pub use config::{LoginConfig, ManagerConfig, OAuthConfig, OAuthTokenKind, RealmConfig};
pub use credential::{Credential, CredentialKind};
pub use error::Error;
pub use event::{INTERACTIVE_LOGIN, InteractiveLogin};
pub use factory::CredentialFactory;
pub use gate::{AccountGate, Eligibility, StatusUserChecker};
pub use manager::{LoginManager, LoginServices, OAuthServices};
pub use registry::{Collaborators, ManagerRegistry};
pub use request::{Cookie, OutgoingResponse, RequestContext, Session, SessionId};
pub use silent::SilentLogin;
pub use tokens::{AccessToken, Secret};
pub use traits::{
    CookieRememberMe, EventPublisher, OAuthUserResolver, RememberMe, RememberMeToken,
    ResourceOwner, ResourceOwnerMap, SessionStrategy, TokenRememberMe, TokenStorage, UserChecker,
    UserInfo,
};
pub use types::{AccountStatus, Identity, ProviderName, RealmName, Role};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
