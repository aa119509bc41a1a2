/// What to do with a class session whose owner's connection goes away.
///
/// The original deployment let orphaned sessions linger until an explicit
/// end call; that stays the default. `End` closes them out during the
/// disconnect sweep and broadcasts `class_ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerDisconnectPolicy {
    #[default]
    Linger,
    End,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bound of each connection's outbound queue. Overflow drops the
    /// newest message rather than blocking a handler; sized so that only
    /// a stalled consumer flooded with screen frames ever hits it.
    pub outbound_queue_capacity: usize,
    pub owner_disconnect: OwnerDisconnectPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 64,
            owner_disconnect: OwnerDisconnectPolicy::default(),
        }
    }
}
