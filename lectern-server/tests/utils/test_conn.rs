use axum::extract::ws::Message;
use lectern_core::{ClientMessage, ServerMessage, UserId};
use lectern_server::{ConnContext, ConnectionHandle, SignalingRouter};
use tokio::sync::mpsc;

/// Stand-in for one connected client: the context the router writes
/// through plus the receiving end of that connection's outbound queue.
pub struct TestConn {
    pub user_id: UserId,
    pub ctx: ConnContext,
    rx: mpsc::Receiver<Message>,
}

impl TestConn {
    pub fn new(user_id: &str) -> Self {
        Self::with_capacity(user_id, 32)
    }

    pub fn with_capacity(user_id: &str, capacity: usize) -> Self {
        let (handle, rx) = ConnectionHandle::new(capacity);
        Self {
            user_id: UserId::from(user_id),
            ctx: ConnContext::new(handle),
            rx,
        }
    }

    /// Announce the identity and swallow the `connected` ack.
    pub fn announce(&mut self, router: &SignalingRouter) {
        let user_id = self.user_id.clone();
        router.handle_message(&mut self.ctx, ClientMessage::Connect { user_id });
        match self.try_recv() {
            Some(ServerMessage::Connected { .. }) => {}
            other => panic!("expected connected ack, got {other:?}"),
        }
    }

    pub fn send(&mut self, router: &SignalingRouter, msg: ClientMessage) {
        router.handle_message(&mut self.ctx, msg);
    }

    pub fn disconnect(&self, router: &SignalingRouter) {
        router.handle_disconnect(&self.ctx);
    }

    /// Next raw frame on the queue, if any.
    pub fn recv_frame(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Next queued server message, if any. The router is synchronous, so
    /// by the time a handler returns everything it sent is already queued.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        match self.recv_frame() {
            Some(Message::Text(text)) => {
                Some(serde_json::from_str(&text).expect("valid server frame"))
            }
            _ => None,
        }
    }

    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Some(msg) = self.try_recv() {
            out.push(msg);
        }
        out
    }
}
