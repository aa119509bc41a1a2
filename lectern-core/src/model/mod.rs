mod ids;
mod message;
mod session;
mod signaling;

pub use ids::{ConnectionId, MeetingId, UserId};
pub use message::{ClientMessage, ServerMessage};
pub use session::SessionSummary;
pub use signaling::IceServerConfig;
