use crate::session::ClassSession;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use lectern_core::{MeetingId, SessionError, SessionSummary, UserId};
use std::sync::Arc;
use tracing::info;

/// What the disconnect sweep removed from one session.
#[derive(Debug)]
pub struct SweepRemoval {
    pub meeting_id: MeetingId,
    /// Members still in the session after the removal, to be notified.
    pub remaining: Vec<UserId>,
    /// The departed participant owned this session.
    pub was_owner: bool,
}

/// Registry of currently active class meetings.
///
/// The only mutation surface for session state; handlers never touch rows
/// directly. All operations are synchronous and in-memory.
#[derive(Clone, Default)]
pub struct SessionTable {
    sessions: Arc<DashMap<MeetingId, ClassSession>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session owned by `teacher_id`, with the owner as the first
    /// participant. A duplicate start is rejected, never merged.
    pub fn start(
        &self,
        meeting_id: MeetingId,
        course_code: String,
        teacher_id: UserId,
    ) -> Result<SessionSummary, SessionError> {
        match self.sessions.entry(meeting_id.clone()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyActive(meeting_id)),
            Entry::Vacant(slot) => {
                let session = ClassSession::new(course_code, teacher_id);
                let summary = session.summary(&meeting_id);
                slot.insert(session);
                info!(meeting_id = %meeting_id, course = %summary.course_code, "class started");
                Ok(summary)
            }
        }
    }

    /// Remove the session, returning its final state for notifications.
    pub fn end(&self, meeting_id: &MeetingId) -> Result<SessionSummary, SessionError> {
        match self.sessions.remove(meeting_id) {
            Some((_, session)) => {
                info!(meeting_id = %meeting_id, "class ended");
                Ok(session.summary(meeting_id))
            }
            None => Err(SessionError::NotFound(meeting_id.clone())),
        }
    }

    pub fn get(&self, meeting_id: &MeetingId) -> Option<SessionSummary> {
        self.sessions
            .get(meeting_id)
            .map(|session| session.summary(meeting_id))
    }

    /// Snapshot of every active session. Finite and restartable; not a
    /// live view.
    pub fn list_active(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .map(|entry| entry.value().summary(entry.key()))
            .collect()
    }

    /// Add a participant; joining twice is a no-op. Returns the updated
    /// participant count.
    pub fn join(&self, meeting_id: &MeetingId, user_id: &UserId) -> Result<usize, SessionError> {
        match self.sessions.get_mut(meeting_id) {
            Some(mut session) => {
                session.participants.insert(user_id.clone());
                Ok(session.participants.len())
            }
            None => Err(SessionError::NotFound(meeting_id.clone())),
        }
    }

    /// Best-effort removal; missing session or participant is not an error.
    pub fn leave(&self, meeting_id: &MeetingId, user_id: &UserId) {
        if let Some(mut session) = self.sessions.get_mut(meeting_id) {
            session.participants.remove(user_id);
        }
    }

    pub fn set_screen_sharing(
        &self,
        meeting_id: &MeetingId,
        is_sharing: bool,
    ) -> Result<bool, SessionError> {
        match self.sessions.get_mut(meeting_id) {
            Some(mut session) => {
                session.screen_sharing = is_sharing;
                Ok(session.screen_sharing)
            }
            None => Err(SessionError::NotFound(meeting_id.clone())),
        }
    }

    pub fn participants(&self, meeting_id: &MeetingId) -> Option<Vec<UserId>> {
        self.sessions
            .get(meeting_id)
            .map(|session| session.participants.iter().cloned().collect())
    }

    pub fn owner(&self, meeting_id: &MeetingId) -> Option<UserId> {
        self.sessions
            .get(meeting_id)
            .map(|session| session.teacher_id.clone())
    }

    /// Remove `user_id` from every session it is in, reporting the members
    /// left behind in each. Linear in sessions x participants, which is
    /// fine for a handful of concurrent classes.
    pub fn sweep_participant(&self, user_id: &UserId) -> Vec<SweepRemoval> {
        let mut removals = Vec::new();
        for mut entry in self.sessions.iter_mut() {
            if entry.value_mut().participants.remove(user_id) {
                removals.push(SweepRemoval {
                    meeting_id: entry.key().clone(),
                    remaining: entry.value().participants.iter().cloned().collect(),
                    was_owner: entry.value().teacher_id == *user_id,
                });
            }
        }
        removals
    }
}
