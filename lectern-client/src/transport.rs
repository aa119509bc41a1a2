use crate::events::RemoteTrack;
use anyhow::Result;
use async_trait::async_trait;
use lectern_core::UserId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which local video source feeds a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFeed {
    Camera,
    Screen,
}

/// One peer-to-peer transport under negotiation.
///
/// The link state machine drives this seam; the production implementation
/// wraps a `webrtc` peer connection, tests substitute a recorder.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Produce the local offer and install it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Apply the remote offer and answer it in one step.
    async fn accept_remote_offer(&self, sdp: String) -> Result<String>;

    async fn accept_remote_answer(&self, sdp: String) -> Result<()>;

    async fn add_remote_candidate(&self, candidate: String) -> Result<()>;

    /// Swap the outgoing video source in place. The negotiated transport
    /// persists; nothing is re-offered.
    async fn replace_video_source(&self, feed: VideoFeed) -> Result<()>;

    async fn close(&self);
}

/// Out-of-band events a transport reports back to the session loop.
#[derive(Debug)]
pub enum LinkEvent {
    Connected(UserId),
    Failed(UserId),
    /// A local trickle-ICE candidate ready to relay to the remote side.
    CandidateReady(UserId, String),
    TrackReceived(UserId, RemoteTrack),
}

/// Creates one transport per remote participant.
#[async_trait]
pub trait LinkFactory: Send + Sync {
    async fn create(
        &self,
        remote: &UserId,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Arc<dyn PeerTransport>>;
}
