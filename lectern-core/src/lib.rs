pub mod error;
pub mod model;

pub use error::SessionError;
pub use model::{
    ClientMessage, ConnectionId, IceServerConfig, MeetingId, ServerMessage, SessionSummary, UserId,
};
