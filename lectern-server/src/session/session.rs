use lectern_core::{MeetingId, SessionSummary, UserId};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// One live class meeting as the server sees it.
///
/// Exists exactly between a teacher's start and an explicit end; the owner
/// stays a member from creation and need not remain connected.
#[derive(Debug)]
pub struct ClassSession {
    pub course_code: String,
    pub teacher_id: UserId,
    /// Unix timestamp in milliseconds.
    pub started_at: u64,
    pub screen_sharing: bool,
    pub participants: HashSet<UserId>,
}

impl ClassSession {
    pub fn new(course_code: String, teacher_id: UserId) -> Self {
        let mut participants = HashSet::new();
        participants.insert(teacher_id.clone());
        Self {
            course_code,
            teacher_id,
            started_at: now_ms(),
            screen_sharing: false,
            participants,
        }
    }

    pub fn summary(&self, meeting_id: &MeetingId) -> SessionSummary {
        SessionSummary {
            meeting_id: meeting_id.clone(),
            course_code: self.course_code.clone(),
            teacher_id: self.teacher_id.clone(),
            started_at: self.started_at,
            screen_sharing: self.screen_sharing,
            participant_count: self.participants.len(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
