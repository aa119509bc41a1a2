use crate::model::ids::{MeetingId, UserId};
use serde::{Deserialize, Serialize};

/// Snapshot of one active class session as reported to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub meeting_id: MeetingId,
    pub course_code: String,
    pub teacher_id: UserId,
    /// Unix timestamp in milliseconds.
    pub started_at: u64,
    pub screen_sharing: bool,
    pub participant_count: usize,
}
