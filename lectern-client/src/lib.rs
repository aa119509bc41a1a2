pub mod events;
pub mod link;
pub mod native;
pub mod session;
pub mod transport;

pub use events::{MediaKind, RemoteTrack, SessionEvents};
pub use link::{LinkRole, LinkState, PeerLink};
pub use native::{MediaTracks, RtcLinkFactory, RtcPeerTransport};
pub use session::{ClassSession, SessionCommand, SessionConfig, SessionHandle};
pub use transport::{LinkEvent, LinkFactory, PeerTransport, VideoFeed};
