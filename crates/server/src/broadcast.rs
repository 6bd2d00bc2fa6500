use std::sync::Arc;

use shared::{
    domain::EventState,
    protocol::{ClientAction, ServerEvent},
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    clock::Clock,
    registry::{ClientChannel, ConnectionId, ConnectionRegistry, Frame},
    store::StateStore,
};

/// Serializes every mutation of the event state together with the broadcast that
/// publishes it.
///
/// The store lock is held from `apply` until every client's queue holds the new frame,
/// so no client can observe a partially applied action, and a newly connected client
/// always receives its snapshot before any broadcast.
pub struct Broadcaster {
    store: Mutex<StateStore>,
    registry: ConnectionRegistry,
    clock: Arc<dyn Clock>,
}

impl Broadcaster {
    pub fn new(store: StateStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(store),
            registry: ConnectionRegistry::new(),
            clock,
        }
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub async fn snapshot(&self) -> EventState {
        self.store.lock().await.state().clone()
    }

    /// Sends the current state to `channel` and then adds it to the broadcast set.
    pub async fn connect(&self, channel: Arc<dyn ClientChannel>) -> ConnectionId {
        let store = self.store.lock().await;
        let id = self.registry.allocate_id();
        match state_frame(store.state()) {
            Ok(frame) => {
                if let Err(error) = channel.send(frame) {
                    debug!(connection_id = %id, %error, "initial snapshot not delivered");
                }
            }
            Err(error) => error!(connection_id = %id, %error, "failed to serialize snapshot"),
        }
        self.registry.register(id, channel).await;
        let clients = self.registry.len().await;
        info!(connection_id = %id, clients, "client connected");
        id
    }

    pub async fn disconnect(&self, id: ConnectionId) {
        if self.registry.unregister(id).await {
            let clients = self.registry.len().await;
            info!(connection_id = %id, clients, "client disconnected");
        }
    }

    /// Decodes and applies one inbound message. Returns whether a broadcast went out.
    pub async fn handle_message(&self, from: ConnectionId, raw: &str) -> bool {
        let action = match ClientAction::decode(raw) {
            Ok(action) => action,
            Err(error) => {
                warn!(connection_id = %from, %error, "dropping malformed message");
                return false;
            }
        };
        info!(connection_id = %from, action = action.action_type(), "received action");
        self.dispatch(action).await
    }

    pub async fn dispatch(&self, action: ClientAction) -> bool {
        let mut store = self.store.lock().await;
        if !store.apply(action, self.clock.now()) {
            return false;
        }
        match state_frame(store.state()) {
            Ok(frame) => {
                self.fan_out(frame).await;
                true
            }
            Err(error) => {
                error!(%error, "failed to serialize state update");
                false
            }
        }
    }

    async fn fan_out(&self, frame: Frame) {
        let clients = self.registry.snapshot().await;
        let mut delivered = 0usize;
        for (id, channel) in &clients {
            if !channel.is_open() {
                continue;
            }
            match channel.send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(error) => debug!(connection_id = %id, %error, "state update not delivered"),
            }
        }
        info!(delivered, clients = clients.len(), "broadcast state update");
    }
}

fn state_frame(state: &EventState) -> Result<Frame, serde_json::Error> {
    let event = ServerEvent::StateUpdate(state.clone());
    serde_json::to_string(&event).map(Frame::from)
}

#[cfg(test)]
#[path = "tests/broadcast_tests.rs"]
mod tests;
