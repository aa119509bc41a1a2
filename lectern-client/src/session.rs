use crate::events::SessionEvents;
use crate::link::{LinkRole, PeerLink};
use crate::transport::{LinkEvent, LinkFactory, VideoFeed};
use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Local operations the embedding application can request.
#[derive(Debug)]
pub enum SessionCommand {
    Join,
    Leave,
    StartScreenShare,
    StopScreenShare,
    /// Fallback path: push one still frame to the classmates.
    SendFrame(String),
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub meeting_id: MeetingId,
    pub user_id: UserId,
    pub display_name: Option<String>,
}

/// Cheap handle for driving a running session loop.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub async fn join(&self) {
        self.send(SessionCommand::Join).await;
    }

    pub async fn leave(&self) {
        self.send(SessionCommand::Leave).await;
    }

    pub async fn start_screen_share(&self) {
        self.send(SessionCommand::StartScreenShare).await;
    }

    pub async fn stop_screen_share(&self) {
        self.send(SessionCommand::StopScreenShare).await;
    }

    pub async fn send_frame(&self, frame: String) {
        self.send(SessionCommand::SendFrame(frame)).await;
    }

    async fn send(&self, cmd: SessionCommand) {
        if self.commands.send(cmd).await.is_err() {
            warn!("class session loop is gone, command dropped");
        }
    }
}

/// Event loop owning every peer link of one participant in one meeting.
///
/// Inbound server frames, application commands and transport events are
/// serialized through a single select! loop, so link state never needs a
/// lock. The outbound side of the signaling bus is an mpsc the embedding
/// application pumps into its socket.
pub struct ClassSession {
    config: SessionConfig,
    links: HashMap<UserId, PeerLink>,
    factory: Arc<dyn LinkFactory>,
    events: Arc<dyn SessionEvents>,
    signal_tx: mpsc::Sender<ClientMessage>,
    command_rx: mpsc::Receiver<SessionCommand>,
    server_rx: mpsc::Receiver<ServerMessage>,
    link_event_tx: mpsc::Sender<LinkEvent>,
    link_event_rx: mpsc::Receiver<LinkEvent>,
    screen_sharing: bool,
}

impl ClassSession {
    pub fn new(
        config: SessionConfig,
        factory: Arc<dyn LinkFactory>,
        events: Arc<dyn SessionEvents>,
        signal_tx: mpsc::Sender<ClientMessage>,
        command_rx: mpsc::Receiver<SessionCommand>,
        server_rx: mpsc::Receiver<ServerMessage>,
    ) -> Self {
        let (link_event_tx, link_event_rx) = mpsc::channel(256);
        Self {
            config,
            links: HashMap::new(),
            factory,
            events,
            signal_tx,
            command_rx,
            server_rx,
            link_event_tx,
            link_event_rx,
            screen_sharing: false,
        }
    }

    /// Spawn the loop and hand back its command handle.
    pub fn spawn(
        config: SessionConfig,
        factory: Arc<dyn LinkFactory>,
        events: Arc<dyn SessionEvents>,
        signal_tx: mpsc::Sender<ClientMessage>,
        server_rx: mpsc::Receiver<ServerMessage>,
    ) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::channel(32);
        let session = Self::new(config, factory, events, signal_tx, command_rx, server_rx);
        tokio::spawn(session.run());
        SessionHandle {
            commands: command_tx,
        }
    }

    pub async fn run(mut self) {
        info!(meeting = %self.config.meeting_id, user = %self.config.user_id, "class session loop started");

        // Announce first so the server can reach us before any join.
        self.signal(ClientMessage::Connect {
            user_id: self.config.user_id.clone(),
        })
        .await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                msg = self.server_rx.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg).await,
                    None => {
                        info!("signaling stream closed, shutting session down");
                        break;
                    }
                },
                evt = self.link_event_rx.recv() => {
                    if let Some(evt) = evt {
                        self.handle_link_event(evt).await;
                    }
                }
            }
        }

        self.close_all_links().await;
        info!(meeting = %self.config.meeting_id, "class session loop finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join => {
                self.signal(ClientMessage::JoinMeeting {
                    meeting_id: self.config.meeting_id.clone(),
                    user_id: self.config.user_id.clone(),
                    display_name: self.config.display_name.clone(),
                })
                .await;
            }

            SessionCommand::Leave => {
                self.signal(ClientMessage::LeaveMeeting {
                    meeting_id: self.config.meeting_id.clone(),
                    user_id: self.config.user_id.clone(),
                })
                .await;
                self.close_all_links().await;
            }

            SessionCommand::StartScreenShare => self.set_screen_share(true).await,
            SessionCommand::StopScreenShare => self.set_screen_share(false).await,

            SessionCommand::SendFrame(frame) => {
                self.signal(ClientMessage::ScreenFrame {
                    meeting_id: self.config.meeting_id.clone(),
                    frame,
                })
                .await;
            }
        }
    }

    async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Connected { user_id, .. } => {
                debug!(user = %user_id, "registration confirmed");
            }

            // Whom to expect offers from: everyone already present
            // initiates toward us, so we only prepare responder links.
            ServerMessage::JoinedOk { participants, .. } => {
                for remote in participants {
                    if remote != self.config.user_id {
                        self.open_link(remote, LinkRole::Responder).await;
                    }
                }
            }

            // We were here first, so we initiate toward the newcomer.
            ServerMessage::ParticipantJoined { user_id, .. } => {
                if user_id == self.config.user_id {
                    return;
                }
                self.open_link(user_id.clone(), LinkRole::Initiator).await;
                let offer = match self.links.get_mut(&user_id) {
                    Some(link) => match link.start().await {
                        Ok(offer) => offer,
                        Err(e) => {
                            warn!(remote = %user_id, error = %e, "could not open offer");
                            return;
                        }
                    },
                    None => return,
                };
                self.signal(ClientMessage::WebrtcOffer {
                    to: user_id,
                    payload: sdp_payload(&offer),
                })
                .await;
            }

            ServerMessage::ParticipantLeft { user_id, .. } => {
                if let Some(mut link) = self.links.remove(&user_id) {
                    link.close().await;
                    self.events.on_peer_disconnected(&user_id).await;
                }
            }

            ServerMessage::WebrtcOffer { from, payload } => {
                let Some(sdp) = payload_sdp(&payload) else {
                    warn!(remote = %from, "offer without sdp payload dropped");
                    return;
                };
                // The joined_ok listing usually precedes this, but an offer
                // can also be the first we hear of a peer.
                self.open_link(from.clone(), LinkRole::Responder).await;
                let answer = match self.links.get_mut(&from) {
                    Some(link) => match link.handle_offer(sdp).await {
                        Ok(answer) => answer,
                        Err(e) => {
                            warn!(remote = %from, error = %e, "offer rejected");
                            return;
                        }
                    },
                    None => return,
                };
                self.signal(ClientMessage::WebrtcAnswer {
                    to: from,
                    payload: sdp_payload(&answer),
                })
                .await;
            }

            ServerMessage::WebrtcAnswer { from, payload } => {
                let Some(sdp) = payload_sdp(&payload) else {
                    warn!(remote = %from, "answer without sdp payload dropped");
                    return;
                };
                match self.links.get_mut(&from) {
                    Some(link) => {
                        if let Err(e) = link.handle_answer(sdp).await {
                            warn!(remote = %from, error = %e, "answer rejected");
                        }
                    }
                    None => debug!(remote = %from, "answer for unknown link dropped"),
                }
            }

            ServerMessage::WebrtcIce { from, payload } => {
                let Some(candidate) = payload_candidate(&payload) else {
                    warn!(remote = %from, "ice without candidate payload dropped");
                    return;
                };
                match self.links.get_mut(&from) {
                    Some(link) => {
                        if let Err(e) = link.handle_candidate(candidate).await {
                            warn!(remote = %from, error = %e, "candidate rejected");
                        }
                    }
                    None => debug!(remote = %from, "candidate for unknown link dropped"),
                }
            }

            ServerMessage::ScreenShareStarted {
                meeting_id,
                user_id,
            } => {
                if meeting_id == self.config.meeting_id {
                    self.events
                        .on_screen_share_changed(&meeting_id, Some(&user_id), true)
                        .await;
                }
            }

            ServerMessage::ScreenShareStopped {
                meeting_id,
                user_id,
            } => {
                if meeting_id == self.config.meeting_id {
                    self.events
                        .on_screen_share_changed(&meeting_id, Some(&user_id), false)
                        .await;
                }
            }

            ServerMessage::ScreenShareUpdate {
                meeting_id,
                is_sharing,
            } => {
                if meeting_id == self.config.meeting_id {
                    self.events
                        .on_screen_share_changed(&meeting_id, None, is_sharing)
                        .await;
                }
            }

            ServerMessage::ClassEnded {
                ref meeting_id, ..
            } if *meeting_id == self.config.meeting_id => {
                info!(meeting = %meeting_id, "class ended, tearing links down");
                self.close_all_links().await;
                self.events.on_notice(&msg).await;
            }

            // Everything else is informational fan-out for the app.
            other => self.events.on_notice(&other).await,
        }
    }

    async fn handle_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected(remote) => {
                if let Some(link) = self.links.get_mut(&remote) {
                    link.mark_connected();
                    self.events.on_peer_connected(&remote).await;
                }
            }

            LinkEvent::Failed(remote) => {
                if let Some(mut link) = self.links.remove(&remote) {
                    link.close().await;
                    self.events.on_peer_disconnected(&remote).await;
                }
            }

            LinkEvent::CandidateReady(remote, candidate) => {
                self.signal(ClientMessage::WebrtcIce {
                    to: remote,
                    payload: candidate_payload(&candidate),
                })
                .await;
            }

            LinkEvent::TrackReceived(remote, track) => {
                self.events.on_remote_track(&remote, track).await;
            }
        }
    }

    async fn set_screen_share(&mut self, active: bool) {
        if self.screen_sharing == active {
            return;
        }
        let feed = if active {
            VideoFeed::Screen
        } else {
            VideoFeed::Camera
        };
        for link in self.links.values() {
            if link.state() == crate::link::LinkState::Connected {
                if let Err(e) = link.replace_video_source(feed).await {
                    warn!(remote = %link.remote(), error = %e, "video source swap failed");
                }
            }
        }
        self.screen_sharing = active;

        let meeting_id = self.config.meeting_id.clone();
        let user_id = self.config.user_id.clone();
        let msg = if active {
            ClientMessage::ScreenShareStarted {
                meeting_id: meeting_id.clone(),
                user_id: user_id.clone(),
            }
        } else {
            ClientMessage::ScreenShareStopped {
                meeting_id: meeting_id.clone(),
                user_id: user_id.clone(),
            }
        };
        self.signal(msg).await;
        self.events
            .on_screen_share_changed(&meeting_id, Some(&user_id), active)
            .await;
    }

    /// Get-or-create; an existing link (whatever its role) is kept as is.
    async fn open_link(&mut self, remote: UserId, role: LinkRole) {
        if self.links.contains_key(&remote) {
            return;
        }
        match self.factory.create(&remote, self.link_event_tx.clone()).await {
            Ok(transport) => {
                debug!(remote = %remote, ?role, "peer link created");
                self.links
                    .insert(remote.clone(), PeerLink::new(remote, role, transport));
            }
            Err(e) => warn!(remote = %remote, error = %e, "peer transport creation failed"),
        }
    }

    async fn close_all_links(&mut self) {
        for (_, mut link) in self.links.drain() {
            link.close().await;
        }
    }

    async fn signal(&self, msg: ClientMessage) {
        if self.signal_tx.send(msg).await.is_err() {
            warn!("signaling bus closed, outbound message dropped");
        }
    }
}

fn sdp_payload(sdp: &str) -> serde_json::Value {
    json!({ "sdp": sdp })
}

fn payload_sdp(payload: &serde_json::Value) -> Option<String> {
    payload.get("sdp")?.as_str().map(str::to_owned)
}

fn candidate_payload(candidate: &str) -> serde_json::Value {
    json!({ "candidate": candidate })
}

fn payload_candidate(payload: &serde_json::Value) -> Option<String> {
    payload.get("candidate")?.as_str().map(str::to_owned)
}
