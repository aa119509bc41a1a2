use crate::events::{MediaKind, RemoteTrack};
use crate::transport::{LinkEvent, LinkFactory, PeerTransport, VideoFeed};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use lectern_core::{IceServerConfig, UserId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Local media sources shared by every link of a session. Tracks are
/// reference-counted and may feed several peer connections at once.
#[derive(Clone, Default)]
pub struct MediaTracks {
    pub camera_video: Option<Arc<dyn TrackLocal + Send + Sync>>,
    pub screen_video: Option<Arc<dyn TrackLocal + Send + Sync>>,
    pub mic_audio: Option<Arc<dyn TrackLocal + Send + Sync>>,
}

/// A VP8 sample track for camera or screen capture pipelines.
pub fn default_video_track(id: &str, stream_id: &str) -> Arc<dyn TrackLocal + Send + Sync> {
    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            ..Default::default()
        },
        id.to_owned(),
        stream_id.to_owned(),
    ))
}

/// An Opus sample track for microphone pipelines.
pub fn default_audio_track(id: &str, stream_id: &str) -> Arc<dyn TrackLocal + Send + Sync> {
    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            ..Default::default()
        },
        id.to_owned(),
        stream_id.to_owned(),
    ))
}

/// `PeerTransport` over a real `webrtc` peer connection, one per remote
/// participant. Trickle ICE, connection-state watching and incoming tracks
/// are reported through the session's link-event channel.
pub struct RtcPeerTransport {
    remote: UserId,
    peer_connection: Arc<RTCPeerConnection>,
    media: MediaTracks,
    video_sender: Mutex<Option<Arc<RTCRtpSender>>>,
}

impl RtcPeerTransport {
    pub async fn connect(
        remote: UserId,
        ice_servers: &[IceServerConfig],
        media: MediaTracks,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        let state_remote = remote.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let remote = state_remote.clone();
                Box::pin(async move {
                    info!(remote = %remote, ?state, "peer connection state changed");
                    match state {
                        RTCPeerConnectionState::Connected => {
                            let _ = tx.send(LinkEvent::Connected(remote)).await;
                        }
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(LinkEvent::Failed(remote)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        let ice_remote = remote.clone();
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let remote = ice_remote.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(json) = candidate.to_json() else {
                    return;
                };
                let Ok(serialized) = serde_json::to_string(&json) else {
                    return;
                };
                let _ = tx
                    .send(LinkEvent::CandidateReady(remote, serialized))
                    .await;
            })
        }));

        let track_tx = events;
        let track_remote = remote.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let remote = track_remote.clone();
            let kind = match track.kind() {
                RTPCodecType::Audio => MediaKind::Audio,
                _ => MediaKind::Video,
            };
            let id = track.id();
            Box::pin(async move {
                debug!(remote = %remote, ?kind, "remote track arrived");
                let _ = tx
                    .send(LinkEvent::TrackReceived(remote, RemoteTrack { kind, id }))
                    .await;
            })
        }));

        let mut video_sender = None;
        if let Some(camera) = &media.camera_video {
            video_sender = Some(peer_connection.add_track(camera.clone()).await?);
        }
        if let Some(mic) = &media.mic_audio {
            peer_connection.add_track(mic.clone()).await?;
        }

        Ok(Self {
            remote,
            peer_connection,
            media,
            video_sender: Mutex::new(video_sender),
        })
    }
}

#[async_trait]
impl PeerTransport for RtcPeerTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn accept_remote_offer(&self, sdp: String) -> Result<String> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(offer).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn accept_remote_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(answer).await?;
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: String) -> Result<()> {
        let candidate: webrtc::ice_transport::ice_candidate::RTCIceCandidateInit =
            serde_json::from_str(&candidate).context("failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn replace_video_source(&self, feed: VideoFeed) -> Result<()> {
        let track = match feed {
            VideoFeed::Camera => self.media.camera_video.clone(),
            VideoFeed::Screen => self.media.screen_video.clone(),
        };
        let Some(track) = track else {
            bail!("no local {feed:?} track configured");
        };
        let sender = self.video_sender.lock().await;
        let Some(sender) = sender.as_ref() else {
            bail!("link to {} carries no outgoing video", self.remote);
        };
        sender.replace_track(Some(track)).await?;
        debug!(remote = %self.remote, ?feed, "outgoing video source swapped");
        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.peer_connection.close().await {
            debug!(remote = %self.remote, error = %e, "peer connection close failed");
        }
    }
}

/// Builds one `RtcPeerTransport` per remote participant, all sharing the
/// session's local media tracks and ICE configuration.
pub struct RtcLinkFactory {
    ice_servers: Vec<IceServerConfig>,
    media: MediaTracks,
}

impl RtcLinkFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>, media: MediaTracks) -> Self {
        Self { ice_servers, media }
    }
}

#[async_trait]
impl LinkFactory for RtcLinkFactory {
    async fn create(
        &self,
        remote: &UserId,
        events: mpsc::Sender<LinkEvent>,
    ) -> Result<Arc<dyn PeerTransport>> {
        let transport = RtcPeerTransport::connect(
            remote.clone(),
            &self.ice_servers,
            self.media.clone(),
            events,
        )
        .await?;
        Ok(Arc::new(transport))
    }
}
