use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};

use crate::integration::test_state;
use crate::utils::TestConn;

fn join_msg(meeting: &str, user: &str, name: &str) -> ClientMessage {
    ClientMessage::JoinMeeting {
        meeting_id: MeetingId::from(meeting),
        user_id: UserId::from(user),
        display_name: Some(name.into()),
    }
}

/// The introduction is asymmetric by design: everyone already present
/// hears `participant_joined` (and will initiate a link toward the
/// newcomer), while the newcomer's `joined_ok` lists whom to expect offers
/// from. Exactly one initiator per pair.
#[tokio::test]
async fn join_notifies_existing_and_lists_for_newcomer() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut s1 = TestConn::new("s1");
    let mut s2 = TestConn::new("s2");
    for conn in [&mut t1, &mut s1, &mut s2] {
        conn.announce(&state.router);
    }

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();

    s1.send(&state.router, join_msg("M-1", "s1", "Student One"));
    match s1.try_recv() {
        Some(ServerMessage::JoinedOk {
            participants,
            ..
        }) => assert_eq!(participants, vec![UserId::from("t1")]),
        other => panic!("expected joined_ok, got {other:?}"),
    }
    match t1.try_recv() {
        Some(ServerMessage::ParticipantJoined {
            user_id,
            display_name,
            ..
        }) => {
            assert_eq!(user_id, UserId::from("s1"));
            assert_eq!(display_name.as_deref(), Some("Student One"));
        }
        other => panic!("expected participant_joined, got {other:?}"),
    }

    s2.send(&state.router, join_msg("M-1", "s2", "Student Two"));

    // S1 was already present, so it hears about S2 — not vice versa.
    assert!(matches!(
        s1.try_recv(),
        Some(ServerMessage::ParticipantJoined { user_id, .. })
            if user_id == UserId::from("s2")
    ));
    match s2.try_recv() {
        Some(ServerMessage::JoinedOk {
            mut participants, ..
        }) => {
            participants.sort();
            assert_eq!(participants, vec![UserId::from("s1"), UserId::from("t1")]);
        }
        other => panic!("expected joined_ok, got {other:?}"),
    }
    assert!(s2.try_recv().is_none(), "newcomer gets no participant_joined");
}

/// Joining twice is a set no-op; the second join still answers the joiner
/// but nobody is re-introduced.
#[tokio::test]
async fn duplicate_join_keeps_count_stable() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut s1 = TestConn::new("s1");
    t1.announce(&state.router);
    s1.announce(&state.router);

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();

    s1.send(&state.router, join_msg("M-1", "s1", "Student One"));
    s1.send(&state.router, join_msg("M-1", "s1", "Student One"));

    assert_eq!(
        state.sessions.get(&MeetingId::from("M-1")).unwrap().participant_count,
        2
    );
}

/// A join for a meeting nobody started is dropped on the socket path; the
/// HTTP surface is where "class not active" is reported.
#[tokio::test]
async fn join_of_inactive_meeting_is_dropped() {
    let state = test_state();

    let mut s1 = TestConn::new("s1");
    s1.announce(&state.router);

    s1.send(&state.router, join_msg("ghost", "s1", "Student One"));

    assert!(s1.try_recv().is_none());
    assert!(state.sessions.get(&MeetingId::from("ghost")).is_none());
}
