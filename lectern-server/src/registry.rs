use axum::extract::ws::Message;
use dashmap::DashMap;
use lectern_core::{ConnectionId, ServerMessage, UserId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{error, warn};

/// Write half of one client connection.
///
/// Wraps a bounded queue drained by the socket's send task. Sends never
/// block a handler: when the queue is full the newest message is dropped
/// and counted. A closed queue means the socket task already exited and
/// ran its disconnect cleanup.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<Message>,
    dropped: Arc<AtomicU64>,
}

impl ConnectionHandle {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = Self {
            id: ConnectionId::next(),
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (handle, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Messages dropped on queue overflow since the connection opened.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns false only when the connection is gone for good.
    pub fn send(&self, msg: &ServerMessage) -> bool {
        match serde_json::to_string(msg) {
            Ok(json) => self.send_text(json),
            Err(e) => {
                error!(connection = %self.id, error = %e, "failed to serialize server message");
                true
            }
        }
    }

    pub fn send_text(&self, json: String) -> bool {
        match self.tx.try_send(Message::Text(json.into())) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    connection = %self.id,
                    dropped,
                    "outbound queue full, dropping newest message"
                );
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Ask the socket task to close the connection.
    pub fn close(&self) {
        let _ = self.tx.try_send(Message::Close(None));
    }
}

/// Maps each announced participant to its single live connection.
///
/// Process-lifetime state, no persistence. A re-announcement overwrites the
/// previous handle; the replaced connection's own socket task tears it down
/// so an in-flight send is never raced.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<DashMap<UserId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: UserId, handle: ConnectionHandle) {
        self.inner.insert(user_id, handle);
    }

    pub fn lookup(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.inner.get(user_id).map(|entry| entry.clone())
    }

    /// Remove the mapping, but only if it still belongs to `connection`.
    ///
    /// A close callback of a connection that was already replaced by a
    /// reconnect must not evict the replacement. Returns whether the entry
    /// was removed.
    pub fn unregister(&self, user_id: &UserId, connection: ConnectionId) -> bool {
        self.inner
            .remove_if(user_id, |_, handle| handle.id() == connection)
            .is_some()
    }

    /// Unconditional removal, for administrative eviction.
    pub fn evict(&self, user_id: &UserId) -> Option<ConnectionHandle> {
        self.inner.remove(user_id).map(|(_, handle)| handle)
    }

    pub fn send_to(&self, user_id: &UserId, msg: &ServerMessage) -> bool {
        match self.lookup(user_id) {
            Some(handle) => handle.send(msg),
            None => false,
        }
    }

    /// Send to every registered connection, optionally skipping one
    /// participant. Per-recipient failures are swallowed.
    pub fn broadcast(&self, msg: &ServerMessage, exclude: Option<&UserId>) {
        let json = match serde_json::to_string(msg) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to serialize broadcast message");
                return;
            }
        };
        for entry in self.inner.iter() {
            if exclude.is_some_and(|skip| skip == entry.key()) {
                continue;
            }
            entry.value().send_text(json.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
