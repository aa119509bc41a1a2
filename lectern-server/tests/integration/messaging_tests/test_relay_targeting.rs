use lectern_core::{ClientMessage, ServerMessage, UserId};
use serde_json::json;

use crate::integration::test_state;
use crate::utils::TestConn;

/// A webrtc offer addressed to one peer reaches only that peer, with the
/// sender identity stamped on. An offer to an unknown peer vanishes
/// without an error to the sender.
#[tokio::test]
async fn offers_reach_only_their_addressee() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    let mut s1 = TestConn::new("s1");
    let mut s2 = TestConn::new("s2");
    for conn in [&mut t1, &mut s1, &mut s2] {
        conn.announce(&state.router);
    }

    let payload = json!({"sdp": "v=0\r\no=- 0 0 IN IP4 127.0.0.1"});
    s1.send(
        &state.router,
        ClientMessage::WebrtcOffer {
            to: UserId::from("t1"),
            payload: payload.clone(),
        },
    );

    match t1.try_recv() {
        Some(ServerMessage::WebrtcOffer { from, payload: got }) => {
            assert_eq!(from, UserId::from("s1"));
            assert_eq!(got, payload);
        }
        other => panic!("expected relayed offer, got {other:?}"),
    }
    assert!(s2.try_recv().is_none(), "bystander must see nothing");
    assert!(s1.try_recv().is_none(), "sender gets no echo");
}

#[tokio::test]
async fn offer_to_disconnected_peer_is_dropped_silently() {
    let state = test_state();

    let mut s1 = TestConn::new("s1");
    s1.announce(&state.router);

    s1.send(
        &state.router,
        ClientMessage::WebrtcOffer {
            to: UserId::from("ghost"),
            payload: serde_json::json!({"sdp": "v=0"}),
        },
    );

    // Best-effort relay: no error frame, nothing queued anywhere.
    assert!(s1.try_recv().is_none());
}

#[tokio::test]
async fn relay_from_unannounced_connection_is_dropped() {
    let state = test_state();

    let mut t1 = TestConn::new("t1");
    t1.announce(&state.router);

    // Never announced, so there is no attributable sender identity.
    let mut rogue = TestConn::new("rogue");
    rogue.send(
        &state.router,
        ClientMessage::WebrtcIce {
            to: UserId::from("t1"),
            payload: serde_json::json!({"candidate": "candidate:1"}),
        },
    );

    assert!(t1.try_recv().is_none());
}
