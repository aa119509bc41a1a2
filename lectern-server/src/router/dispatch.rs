use crate::config::OwnerDisconnectPolicy;
use crate::notify::Notifier;
use crate::registry::{ConnectionHandle, ConnectionRegistry};
use crate::session::SessionTable;
use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};
use tracing::{debug, info, warn};

/// Per-socket state threaded through the router.
///
/// `identity` is set by the announce message; until then the connection is
/// unreachable for pushes and cannot send attributable signaling.
pub struct ConnContext {
    pub handle: ConnectionHandle,
    pub identity: Option<UserId>,
}

impl ConnContext {
    pub fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            identity: None,
        }
    }
}

/// Interprets inbound frames, mutates session state through the table and
/// registry contracts, and relays or broadcasts the results.
///
/// Handlers never await anything; every mutation is synchronous, so one
/// frame is fully processed before the next from the same connection.
#[derive(Clone)]
pub struct SignalingRouter {
    registry: ConnectionRegistry,
    sessions: SessionTable,
    notifier: Notifier,
    owner_disconnect: OwnerDisconnectPolicy,
}

impl SignalingRouter {
    pub fn new(
        registry: ConnectionRegistry,
        sessions: SessionTable,
        notifier: Notifier,
        owner_disconnect: OwnerDisconnectPolicy,
    ) -> Self {
        Self {
            registry,
            sessions,
            notifier,
            owner_disconnect,
        }
    }

    pub fn handle_message(&self, ctx: &mut ConnContext, msg: ClientMessage) {
        match msg {
            ClientMessage::Connect { user_id } => self.handle_connect(ctx, user_id),

            ClientMessage::JoinMeeting {
                meeting_id,
                user_id,
                display_name,
            } => self.handle_join(ctx, meeting_id, user_id, display_name),

            ClientMessage::LeaveMeeting {
                meeting_id,
                user_id,
            } => self.handle_leave(meeting_id, user_id),

            ClientMessage::WebrtcOffer { to, payload } => {
                self.relay(ctx, to, |from| ServerMessage::WebrtcOffer { from, payload })
            }
            ClientMessage::WebrtcAnswer { to, payload } => {
                self.relay(ctx, to, |from| ServerMessage::WebrtcAnswer { from, payload })
            }
            ClientMessage::WebrtcIce { to, payload } => {
                self.relay(ctx, to, |from| ServerMessage::WebrtcIce { from, payload })
            }

            ClientMessage::ScreenShareStarted {
                meeting_id,
                user_id,
            } => self.handle_screen_share(meeting_id, user_id, true),

            ClientMessage::ScreenShareStopped {
                meeting_id,
                user_id,
            } => self.handle_screen_share(meeting_id, user_id, false),

            ClientMessage::ScreenFrame { meeting_id, frame } => {
                self.handle_screen_frame(ctx, meeting_id, frame)
            }
        }
    }

    /// Cleanup for a closed transport: drop the registry entry (unless a
    /// reconnect already replaced it) and sweep every session the
    /// participant was in, telling the remaining members.
    pub fn handle_disconnect(&self, ctx: &ConnContext) {
        let Some(user_id) = &ctx.identity else {
            return;
        };
        if !self.registry.unregister(user_id, ctx.handle.id()) {
            // A newer connection took over this identity; its state is not
            // ours to clean up.
            debug!(user = %user_id, "stale close, registry entry already replaced");
            return;
        }
        info!(user = %user_id, "participant disconnected");

        for removal in self.sessions.sweep_participant(user_id) {
            let left = ServerMessage::ParticipantLeft {
                meeting_id: removal.meeting_id.clone(),
                user_id: user_id.clone(),
            };
            for member in &removal.remaining {
                self.registry.send_to(member, &left);
            }

            if removal.was_owner && self.owner_disconnect == OwnerDisconnectPolicy::End {
                if let Ok(summary) = self.sessions.end(&removal.meeting_id) {
                    info!(meeting_id = %removal.meeting_id, "owner gone, ending class");
                    self.notifier.class_ended(&summary);
                }
            }
        }
    }

    fn handle_connect(&self, ctx: &mut ConnContext, user_id: UserId) {
        self.registry.register(user_id.clone(), ctx.handle.clone());
        ctx.identity = Some(user_id.clone());
        info!(user = %user_id, "participant announced");

        ctx.handle.send(&ServerMessage::Connected {
            user_id,
            message: "Connected to real-time notifications".into(),
        });
    }

    fn handle_join(
        &self,
        ctx: &ConnContext,
        meeting_id: MeetingId,
        user_id: UserId,
        display_name: Option<String>,
    ) {
        let others: Vec<UserId> = match self.sessions.participants(&meeting_id) {
            Some(participants) => participants.into_iter().filter(|p| *p != user_id).collect(),
            None => {
                // The HTTP surface is where a "class not active" answer is
                // delivered; over the socket a dead meeting id is a no-op.
                info!(meeting_id = %meeting_id, user = %user_id, "join for inactive class dropped");
                return;
            }
        };

        if let Err(e) = self.sessions.join(&meeting_id, &user_id) {
            debug!(meeting_id = %meeting_id, error = %e, "class ended mid-join");
            return;
        }
        info!(meeting_id = %meeting_id, user = %user_id, "participant joined");

        // Both sides of the introduction: the people already there learn
        // about the newcomer (and will initiate links toward them), and the
        // newcomer gets the list of whom to expect offers from.
        let joined = ServerMessage::ParticipantJoined {
            meeting_id: meeting_id.clone(),
            user_id: user_id.clone(),
            display_name,
        };
        for member in &others {
            self.registry.send_to(member, &joined);
        }

        ctx.handle.send(&ServerMessage::JoinedOk {
            meeting_id,
            participants: others,
        });
    }

    fn handle_leave(&self, meeting_id: MeetingId, user_id: UserId) {
        self.sessions.leave(&meeting_id, &user_id);

        let Some(remaining) = self.sessions.participants(&meeting_id) else {
            return;
        };
        let left = ServerMessage::ParticipantLeft {
            meeting_id,
            user_id,
        };
        for member in &remaining {
            self.registry.send_to(member, &left);
        }
    }

    /// Forward a negotiation frame to exactly its addressee, stamping the
    /// sender identity. An unknown target is dropped without telling the
    /// sender; the peer may simply have disconnected mid-negotiation.
    fn relay<F>(&self, ctx: &ConnContext, to: UserId, build: F)
    where
        F: FnOnce(UserId) -> ServerMessage,
    {
        let Some(from) = ctx.identity.clone() else {
            warn!(target = %to, "signaling relay from unannounced connection dropped");
            return;
        };
        if !self.registry.send_to(&to, &build(from)) {
            debug!(target = %to, "relay target not connected, dropping signal");
        }
    }

    fn handle_screen_share(&self, meeting_id: MeetingId, user_id: UserId, sharing: bool) {
        if let Err(e) = self.sessions.set_screen_sharing(&meeting_id, sharing) {
            warn!(meeting_id = %meeting_id, error = %e, "screen share toggle for inactive class");
            return;
        }

        let msg = if sharing {
            ServerMessage::ScreenShareStarted {
                meeting_id,
                user_id,
            }
        } else {
            ServerMessage::ScreenShareStopped {
                meeting_id,
                user_id,
            }
        };
        self.registry.broadcast(&msg, None);
    }

    /// Fallback path: forward still frames to the sender's classmates.
    /// Best-effort and lossy; a slow consumer misses frames via its queue
    /// bound rather than growing memory.
    fn handle_screen_frame(&self, ctx: &ConnContext, meeting_id: MeetingId, frame: String) {
        let Some(sender) = &ctx.identity else {
            warn!(meeting_id = %meeting_id, "screen frame from unannounced connection dropped");
            return;
        };
        let Some(participants) = self.sessions.participants(&meeting_id) else {
            debug!(meeting_id = %meeting_id, "screen frame for inactive class dropped");
            return;
        };

        let msg = ServerMessage::ScreenFrame { meeting_id, frame };
        for member in participants.iter().filter(|p| *p != sender) {
            self.registry.send_to(member, &msg);
        }
    }
}
