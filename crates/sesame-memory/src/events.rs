//! Event publisher that keeps what it receives.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use sesame_core::traits::EventPublisher;
use sesame_core::{InteractiveLogin, ProviderName, RealmName, SessionId};
use tracing::debug;
use uuid::Uuid;

/// Snapshot of a published interactive-login event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub name: String,
    pub request_id: Uuid,
    pub session_id: SessionId,
    pub username: String,
    pub realm: RealmName,
    pub resource_owner: Option<ProviderName>,
    pub occurred_at: DateTime<Utc>,
}

/// Publisher recording every event in publication order.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, name: &str, event: &InteractiveLogin<'_>) {
        let credential = event.credential();
        let recorded = RecordedEvent {
            name: name.to_string(),
            request_id: event.request().id(),
            session_id: event.request().session().id().clone(),
            username: credential.identity().username().to_string(),
            realm: credential.realm().clone(),
            resource_owner: credential.resource_owner().cloned(),
            occurred_at: event.occurred_at(),
        };
        debug!(event = name, user = %recorded.username, "Event published");

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}
