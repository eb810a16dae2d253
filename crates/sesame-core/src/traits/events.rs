//! Event publishing trait.

use crate::event::InteractiveLogin;

/// Publishes login notifications to external listeners.
///
/// Fire-and-forget: listener failures are the publisher's concern.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, name: &str, event: &InteractiveLogin<'_>);
}
