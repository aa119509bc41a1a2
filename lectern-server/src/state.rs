use crate::config::ServerConfig;
use crate::notify::Notifier;
use crate::registry::ConnectionRegistry;
use crate::router::SignalingRouter;
use crate::session::SessionTable;
use std::sync::Arc;

/// Everything the handlers share. The registry and table are owned here
/// and mutated only through the router, the fan-out and the HTTP surface.
pub struct AppState {
    pub registry: ConnectionRegistry,
    pub sessions: SessionTable,
    pub router: SignalingRouter,
    pub notifier: Notifier,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let registry = ConnectionRegistry::new();
        let sessions = SessionTable::new();
        let notifier = Notifier::new(registry.clone());
        let router = SignalingRouter::new(
            registry.clone(),
            sessions.clone(),
            notifier.clone(),
            config.owner_disconnect,
        );
        Arc::new(Self {
            registry,
            sessions,
            router,
            notifier,
            config,
        })
    }
}
