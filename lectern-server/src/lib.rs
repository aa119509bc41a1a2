pub mod api;
pub mod config;
pub mod notify;
pub mod registry;
pub mod router;
pub mod session;
pub mod state;

pub use config::{OwnerDisconnectPolicy, ServerConfig};
pub use notify::Notifier;
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use router::{ConnContext, SignalingRouter, ws_handler};
pub use session::{SessionTable, SweepRemoval};
pub use state::AppState;
