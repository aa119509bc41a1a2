use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};
use lectern_server::{OwnerDisconnectPolicy, ServerConfig};

use crate::integration::{test_state, test_state_with};
use crate::utils::TestConn;

fn start_and_join(state: &std::sync::Arc<lectern_server::AppState>) -> (TestConn, TestConn) {
    let mut teacher = TestConn::new("t1");
    let mut student = TestConn::new("s1");
    teacher.announce(&state.router);
    student.announce(&state.router);

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();
    student.send(
        &state.router,
        ClientMessage::JoinMeeting {
            meeting_id: MeetingId::from("M-1"),
            user_id: UserId::from("s1"),
            display_name: None,
        },
    );
    teacher.drain();
    student.drain();
    (teacher, student)
}

/// Default policy: a session whose owner drops lingers until an explicit
/// end call.
#[tokio::test]
async fn owner_disconnect_lingers_by_default() {
    let state = test_state();
    let (teacher, mut student) = start_and_join(&state);

    teacher.disconnect(&state.router);

    assert!(matches!(
        student.try_recv(),
        Some(ServerMessage::ParticipantLeft { user_id, .. })
            if user_id == UserId::from("t1")
    ));
    assert!(student.try_recv().is_none());

    let session = state.sessions.get(&MeetingId::from("M-1")).unwrap();
    assert_eq!(session.participant_count, 1);
}

/// With the End policy the sweep closes out orphaned sessions and
/// broadcasts class_ended.
#[tokio::test]
async fn owner_disconnect_can_end_the_class() {
    let state = test_state_with(ServerConfig {
        owner_disconnect: OwnerDisconnectPolicy::End,
        ..ServerConfig::default()
    });
    let (teacher, mut student) = start_and_join(&state);

    teacher.disconnect(&state.router);

    assert!(matches!(
        student.try_recv(),
        Some(ServerMessage::ParticipantLeft { .. })
    ));
    assert!(matches!(
        student.try_recv(),
        Some(ServerMessage::ClassEnded { meeting_id, course_code })
            if meeting_id == MeetingId::from("M-1") && course_code == "CS101"
    ));
    assert!(state.sessions.get(&MeetingId::from("M-1")).is_none());
}

/// A student disconnect never triggers the owner policy.
#[tokio::test]
async fn student_disconnect_never_ends_the_class() {
    let state = test_state_with(ServerConfig {
        owner_disconnect: OwnerDisconnectPolicy::End,
        ..ServerConfig::default()
    });
    let (mut teacher, student) = start_and_join(&state);

    student.disconnect(&state.router);

    assert!(matches!(
        teacher.try_recv(),
        Some(ServerMessage::ParticipantLeft { user_id, .. })
            if user_id == UserId::from("s1")
    ));
    assert!(teacher.try_recv().is_none());
    assert!(state.sessions.get(&MeetingId::from("M-1")).is_some());
}
