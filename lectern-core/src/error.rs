use crate::model::MeetingId;
use thiserror::Error;

/// Contract-level failures of the meeting session table.
///
/// Everything here is recoverable and handled at the call site; no session
/// error ever tears down a connection or the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A teacher tried to start a meeting id that is already live.
    /// Duplicate starts are rejected, never merged.
    #[error("class session {0} is already active")]
    AlreadyActive(MeetingId),

    /// The referenced meeting has not been started or was already ended.
    #[error("no active class session {0}")]
    NotFound(MeetingId),
}
