use lectern_core::{ClientMessage, ServerMessage, UserId};

use crate::integration::test_state;
use crate::utils::TestConn;

#[tokio::test]
async fn announce_is_acknowledged_with_identity() {
    let state = test_state();

    let mut conn = TestConn::new("alice");
    let user_id = conn.user_id.clone();
    conn.send(&state.router, ClientMessage::Connect { user_id });

    match conn.try_recv() {
        Some(ServerMessage::Connected { user_id, .. }) => {
            assert_eq!(user_id, UserId::from("alice"));
        }
        other => panic!("expected connected ack, got {other:?}"),
    }
    assert!(state.registry.lookup(&UserId::from("alice")).is_some());
}
