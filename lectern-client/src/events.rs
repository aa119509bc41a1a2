use async_trait::async_trait;
use lectern_core::{MeetingId, ServerMessage, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// A remote media track that became available on a peer link.
#[derive(Debug, Clone)]
pub struct RemoteTrack {
    pub kind: MediaKind,
    pub id: String,
}

/// Callbacks the embedding application receives from a class session.
///
/// Rendering is entirely the application's business; the session only
/// reports what happened.
#[async_trait]
pub trait SessionEvents: Send + Sync {
    async fn on_remote_track(&self, remote: &UserId, track: RemoteTrack);

    async fn on_peer_connected(&self, remote: &UserId);

    async fn on_peer_disconnected(&self, remote: &UserId);

    /// `user_id` is absent when the flag flip came through the HTTP
    /// surface rather than from a participant's socket.
    async fn on_screen_share_changed(
        &self,
        meeting_id: &MeetingId,
        user_id: Option<&UserId>,
        active: bool,
    );

    /// Fan-out notices (class started/ended, approvals, account removal,
    /// fallback screen frames) the application may display or log.
    async fn on_notice(&self, _notice: &ServerMessage) {}
}
