use chrono::{DateTime, Utc};
use shared::{domain::EventState, protocol::ClientAction};

use crate::dispatcher;

/// Owner of the single authoritative [`EventState`].
///
/// The store itself is not synchronized; callers serialize access (see
/// [`crate::broadcast::Broadcaster`]).
#[derive(Debug, Clone)]
pub struct StateStore {
    state: EventState,
}

impl StateStore {
    pub fn new(initial: EventState) -> Self {
        Self { state: initial }
    }

    pub fn state(&self) -> &EventState {
        &self.state
    }

    pub fn apply(&mut self, action: ClientAction, now: DateTime<Utc>) -> bool {
        dispatcher::apply(&mut self.state, action, now)
    }
}
