mod dispatch;
mod ws;

pub use dispatch::{ConnContext, SignalingRouter};
pub use ws::ws_handler;
