//! Anti-forgery state values.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

/// How long an issued state stays valid, in seconds.
pub const DEFAULT_STATE_TTL_SECS: i64 = 600;

/// Issued state values awaiting the provider callback.
///
/// Each value validates at most once.
#[derive(Debug)]
pub struct StateStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_STATE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Issue a fresh state value to send with the authorization redirect.
    ///
    /// Expired states are dropped first.
    pub fn issue(&self) -> String {
        self.issue_at(Utc::now())
    }

    fn issue_at(&self, now: DateTime<Utc>) -> String {
        let state = Uuid::new_v4().simple().to_string();
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        issued.retain(|_, expires_at| *expires_at > now);
        issued.insert(state.clone(), now + self.ttl);
        debug!(outstanding = issued.len(), "Issued anti-forgery state");
        state
    }

    /// Check and consume `state`.
    pub fn validate(&self, state: &str) -> bool {
        self.validate_at(state, Utc::now())
    }

    fn validate_at(&self, state: &str, now: DateTime<Utc>) -> bool {
        let mut issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        issued.retain(|_, expires_at| *expires_at > now);
        issued.remove(state).is_some()
    }

    /// Number of unexpired states awaiting a callback.
    pub fn len(&self) -> usize {
        self.len_at(Utc::now())
    }

    fn len_at(&self, now: DateTime<Utc>) -> usize {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|expires_at| **expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
