//! sesame-memory - In-process collaborators for login managers.
//!
//! Everything here keeps its state in memory. The types are meant for
//! tests, single-process deployments and the `sesame` CLI dry runs.

mod events;
mod oauth;
mod remember;
mod session;
mod storage;

pub use events::{RecordedEvent, RecordingPublisher};
pub use oauth::{FixtureUserResolver, StaticResourceOwner};
pub use remember::{
    PersistentToken, PersistentTokenRememberMe, REMEMBER_ME_COOKIE, SimpleHashRememberMe,
};
pub use session::SessionFixation;
pub use storage::MemoryTokenStorage;
