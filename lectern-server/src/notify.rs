use crate::registry::ConnectionRegistry;
use lectern_core::{MeetingId, ServerMessage, SessionSummary, UserId};
use tracing::{debug, info};

/// Pushes server-originated events to one or all connected clients.
///
/// Pure fan-out over the connection registry; session state is never
/// mutated here, except for the eviction that account deletion mandates.
#[derive(Clone)]
pub struct Notifier {
    registry: ConnectionRegistry,
}

impl Notifier {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn class_started(&self, session: &SessionSummary) {
        self.registry.broadcast(
            &ServerMessage::ClassStarted {
                meeting_id: session.meeting_id.clone(),
                course_code: session.course_code.clone(),
                teacher_id: Some(session.teacher_id.clone()),
            },
            None,
        );
    }

    pub fn class_ended(&self, session: &SessionSummary) {
        self.registry.broadcast(
            &ServerMessage::ClassEnded {
                meeting_id: session.meeting_id.clone(),
                course_code: session.course_code.clone(),
            },
            None,
        );
    }

    /// Everyone hears about flag flips; clients filter by meeting id.
    pub fn screen_share_update(&self, meeting_id: &MeetingId, is_sharing: bool) {
        self.registry.broadcast(
            &ServerMessage::ScreenShareUpdate {
                meeting_id: meeting_id.clone(),
                is_sharing,
            },
            None,
        );
    }

    pub fn student_joined(
        &self,
        teacher_id: &UserId,
        meeting_id: &MeetingId,
        student_id: &UserId,
        total_participants: usize,
    ) -> bool {
        let delivered = self.registry.send_to(
            teacher_id,
            &ServerMessage::StudentJoined {
                meeting_id: meeting_id.clone(),
                student_id: student_id.clone(),
                total_participants,
            },
        );
        if !delivered {
            debug!(teacher = %teacher_id, "teacher not connected, join notice skipped");
        }
        delivered
    }

    pub fn approval(&self, user_id: &UserId, message: String) -> bool {
        self.registry.send_to(
            user_id,
            &ServerMessage::Approval {
                user_id: user_id.clone(),
                message,
            },
        )
    }

    /// Notify the user, then close and evict their connection.
    pub fn account_deleted(&self, user_id: &UserId, message: String) -> bool {
        let notified = self.registry.send_to(
            user_id,
            &ServerMessage::AccountDeleted {
                user_id: user_id.clone(),
                message,
            },
        );
        if let Some(handle) = self.registry.evict(user_id) {
            handle.close();
            info!(user = %user_id, "connection evicted after account deletion");
        }
        notified
    }
}
