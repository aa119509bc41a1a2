pub mod connection_tests;
pub mod messaging_tests;

use lectern_server::{AppState, ServerConfig};
use std::sync::Arc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn test_state() -> Arc<AppState> {
    test_state_with(ServerConfig::default())
}

pub fn test_state_with(config: ServerConfig) -> Arc<AppState> {
    init_tracing();
    AppState::new(config)
}
