use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};

use crate::integration::test_state;
use crate::utils::TestConn;

#[tokio::test]
async fn leave_tells_everyone_still_present() {
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
    for user in ["s1", "s2"] {
        state
            .sessions
            .join(&MeetingId::from("M-1"), &UserId::from(user))
            .unwrap();
    }
    t1.drain();
    s1.drain();
    s2.drain();

    s1.send(
        &state.router,
        ClientMessage::LeaveMeeting {
            meeting_id: MeetingId::from("M-1"),
            user_id: UserId::from("s1"),
        },
    );

    for conn in [&mut t1, &mut s2] {
        assert!(matches!(
            conn.try_recv(),
            Some(ServerMessage::ParticipantLeft { user_id, .. })
                if user_id == UserId::from("s1")
        ));
    }
    assert!(s1.try_recv().is_none(), "the leaver is not notified");
    assert_eq!(
        state.sessions.get(&MeetingId::from("M-1")).unwrap().participant_count,
        2
    );
}

/// Leaving a meeting one never joined, or one that does not exist, is a
/// silent no-op.
#[tokio::test]
async fn leave_is_best_effort() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut stranger = TestConn::new("stranger");
    t1.announce(&state.router);
    stranger.announce(&state.router);

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();
    t1.drain();

    stranger.send(
        &state.router,
        ClientMessage::LeaveMeeting {
            meeting_id: MeetingId::from("M-1"),
            user_id: UserId::from("stranger"),
        },
    );
    stranger.send(
        &state.router,
        ClientMessage::LeaveMeeting {
            meeting_id: MeetingId::from("ghost"),
            user_id: UserId::from("stranger"),
        },
    );

    // Membership is unchanged. The notification for the existing meeting
    // still goes out; a client holding no link to the stranger ignores it.
    assert_eq!(
        state.sessions.get(&MeetingId::from("M-1")).unwrap().participant_count,
        1
    );
    assert!(matches!(
        t1.try_recv(),
        Some(ServerMessage::ParticipantLeft { user_id, .. })
            if user_id == UserId::from("stranger")
    ));
    assert!(t1.try_recv().is_none());
}
