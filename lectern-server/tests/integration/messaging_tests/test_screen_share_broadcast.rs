use lectern_core::{ClientMessage, MeetingId, ServerMessage, UserId};

use crate::integration::test_state;
use crate::utils::TestConn;

/// The screen-share flag set through the HTTP surface is broadcast to
/// every connected client, not just the meeting's participants; clients
/// filter by meeting id themselves.
#[tokio::test]
async fn flag_update_reaches_every_connection() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut s1 = TestConn::new("s1");
    let mut outsider = TestConn::new("outsider");
    for conn in [&mut t1, &mut s1, &mut outsider] {
        conn.announce(&state.router);
    }

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();
    state
        .sessions
        .join(&MeetingId::from("M-1"), &UserId::from("s1"))
        .unwrap();
    t1.drain();
    s1.drain();
    outsider.drain();

    let is_sharing = state
        .sessions
        .set_screen_sharing(&MeetingId::from("M-1"), true)
        .unwrap();
    state
        .notifier
        .screen_share_update(&MeetingId::from("M-1"), is_sharing);

    for conn in [&mut t1, &mut s1, &mut outsider] {
        match conn.try_recv() {
            Some(ServerMessage::ScreenShareUpdate {
                meeting_id,
                is_sharing,
            }) => {
                assert_eq!(meeting_id, MeetingId::from("M-1"));
                assert!(is_sharing);
            }
            other => panic!("expected screen_share_update, got {other:?}"),
        }
    }
}

/// The socket-path toggle updates the session flag and re-broadcasts the
/// toggle message globally.
#[tokio::test]
async fn socket_toggle_sets_flag_and_broadcasts() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut outsider = TestConn::new("outsider");
    t1.announce(&state.router);
    outsider.announce(&state.router);

    state
        .sessions
        .start(MeetingId::from("M-1"), "CS101".into(), UserId::from("t1"))
        .unwrap();
    t1.drain();
    outsider.drain();

    t1.send(
        &state.router,
        ClientMessage::ScreenShareStarted {
            meeting_id: MeetingId::from("M-1"),
            user_id: UserId::from("t1"),
        },
    );

    assert!(state.sessions.get(&MeetingId::from("M-1")).unwrap().screen_sharing);
    for conn in [&mut t1, &mut outsider] {
        assert!(matches!(
            conn.try_recv(),
            Some(ServerMessage::ScreenShareStarted { .. })
        ));
    }
}

#[tokio::test]
async fn toggle_for_inactive_class_is_ignored() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    t1.announce(&state.router);

    t1.send(
        &state.router,
        ClientMessage::ScreenShareStopped {
            meeting_id: MeetingId::from("ghost"),
            user_id: UserId::from("t1"),
        },
    );

    assert!(t1.try_recv().is_none());
}
