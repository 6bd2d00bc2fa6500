use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use thiserror::Error;
use tokio::sync::{watch, RwLock};

/// One serialized outbound message, shared by every recipient of a broadcast.
pub type Frame = Arc<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("client channel is closed")]
    Closed,
}

/// Outbound half of a client connection. Sending never blocks.
pub trait ClientChannel: Send + Sync {
    fn send(&self, frame: Frame) -> Result<(), DeliveryError>;
    fn is_open(&self) -> bool;
}

/// Per-client outbound slot. Every frame is a full snapshot, so a newer frame replaces
/// any the client has not read yet and a stalled reader holds at most one.
pub type FrameSender = watch::Sender<Option<Frame>>;

pub struct FrameReceiver(watch::Receiver<Option<Frame>>);

pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    let (tx, rx) = watch::channel(None);
    (tx, FrameReceiver(rx))
}

impl FrameReceiver {
    /// Waits for the next unread frame. `None` once the sending side is gone.
    pub async fn recv(&mut self) -> Option<Frame> {
        loop {
            self.0.changed().await.ok()?;
            if let Some(frame) = self.0.borrow_and_update().clone() {
                return Some(frame);
            }
        }
    }

    #[cfg(test)]
    pub fn try_recv(&mut self) -> Option<Frame> {
        match self.0.has_changed() {
            Ok(true) => self.0.borrow_and_update().clone(),
            _ => None,
        }
    }
}

impl ClientChannel for FrameSender {
    fn send(&self, frame: Frame) -> Result<(), DeliveryError> {
        watch::Sender::send(self, Some(frame)).map_err(|_| DeliveryError::Closed)
    }

    fn is_open(&self) -> bool {
        !self.is_closed()
    }
}

/// Currently connected clients, keyed by a server-assigned id.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: RwLock<HashMap<ConnectionId, Arc<dyn ClientChannel>>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&self) -> ConnectionId {
        ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub async fn register(&self, id: ConnectionId, channel: Arc<dyn ClientChannel>) {
        self.clients.write().await.insert(id, channel);
    }

    /// Returns false if the client was already gone.
    pub async fn unregister(&self, id: ConnectionId) -> bool {
        self.clients.write().await.remove(&id).is_some()
    }

    /// Copies the current membership so callers can iterate without holding the lock.
    pub async fn snapshot(&self) -> Vec<(ConnectionId, Arc<dyn ClientChannel>)> {
        self.clients
            .read()
            .await
            .iter()
            .map(|(id, channel)| (*id, Arc::clone(channel)))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
