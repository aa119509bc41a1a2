use crate::transport::{PeerTransport, VideoFeed};
use anyhow::{Result, ensure};
use lectern_core::UserId;
use std::sync::Arc;
use tracing::{debug, warn};

/// Negotiation progress of one peer link.
///
/// `Connecting` is the initiator waiting for the answer; a responder goes
/// straight to `Negotiating` since applying the offer and producing the
/// answer happen in one step. There is no retry path: a failed link is
/// closed and a fresh one is made by re-running the join handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Negotiating,
    Connected,
    Closed,
}

/// Exactly one side of each pair initiates: the participants already in
/// the meeting offer toward the newcomer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Initiator,
    Responder,
}

/// State machine for the media path to one remote participant.
///
/// ICE candidates may arrive before the offer/answer exchange settles;
/// they are buffered until a remote description exists and then applied
/// in arrival order.
pub struct PeerLink {
    remote: UserId,
    role: LinkRole,
    state: LinkState,
    transport: Arc<dyn PeerTransport>,
    pending_candidates: Vec<String>,
    remote_description_set: bool,
}

impl PeerLink {
    pub fn new(remote: UserId, role: LinkRole, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            remote,
            role,
            state: LinkState::Idle,
            transport,
            pending_candidates: Vec::new(),
            remote_description_set: false,
        }
    }

    pub fn remote(&self) -> &UserId {
        &self.remote
    }

    pub fn role(&self) -> LinkRole {
        self.role
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Initiator side: produce the offer to relay to the remote.
    pub async fn start(&mut self) -> Result<String> {
        ensure!(self.role == LinkRole::Initiator, "responder does not offer");
        ensure!(self.state == LinkState::Idle, "link already started");
        let offer = self.transport.create_offer().await?;
        self.state = LinkState::Connecting;
        Ok(offer)
    }

    /// Responder side: apply the remote offer, return the answer to relay.
    pub async fn handle_offer(&mut self, sdp: String) -> Result<String> {
        ensure!(
            self.state == LinkState::Idle,
            "duplicate offer for link to {}",
            self.remote
        );
        let answer = self.transport.accept_remote_offer(sdp).await?;
        self.remote_description_set = true;
        self.flush_candidates().await;
        self.state = LinkState::Negotiating;
        Ok(answer)
    }

    /// Initiator side: the remote answered our offer.
    pub async fn handle_answer(&mut self, sdp: String) -> Result<()> {
        ensure!(
            self.state == LinkState::Connecting,
            "answer without an outstanding offer for {}",
            self.remote
        );
        self.transport.accept_remote_answer(sdp).await?;
        self.remote_description_set = true;
        self.flush_candidates().await;
        self.state = LinkState::Negotiating;
        Ok(())
    }

    /// Trickled candidate from the remote; buffered while no remote
    /// description is set yet.
    pub async fn handle_candidate(&mut self, candidate: String) -> Result<()> {
        if self.state == LinkState::Closed {
            return Ok(());
        }
        if !self.remote_description_set {
            debug!(remote = %self.remote, "buffering early ICE candidate");
            self.pending_candidates.push(candidate);
            return Ok(());
        }
        self.transport.add_remote_candidate(candidate).await
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_remote_candidate(candidate).await {
                warn!(remote = %self.remote, error = %e, "buffered candidate rejected");
            }
        }
    }

    /// The transport reported the media path is up.
    pub fn mark_connected(&mut self) {
        if self.state != LinkState::Closed {
            self.state = LinkState::Connected;
        }
    }

    /// Swap the outgoing video source on a live link; the session stays
    /// negotiated.
    pub async fn replace_video_source(&self, feed: VideoFeed) -> Result<()> {
        ensure!(
            self.state == LinkState::Connected,
            "source swap needs a connected link"
        );
        self.transport.replace_video_source(feed).await
    }

    pub async fn close(&mut self) {
        if self.state != LinkState::Closed {
            self.transport.close().await;
            self.state = LinkState::Closed;
        }
    }
}
