use crate::model::ids::{MeetingId, UserId};
use serde::{Deserialize, Serialize};

/// Frames a client may send over its signaling connection.
///
/// The wire format is JSON with a `type` discriminator; field names follow
/// the browser clients (camelCase). Unknown types fail to parse and are
/// dropped by the router without closing the connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Bind this connection to a participant identity. Legacy clients say
    /// `subscribe`, newer ones `connect`; both are accepted.
    #[serde(alias = "subscribe")]
    #[serde(rename_all = "camelCase")]
    Connect { user_id: UserId },

    #[serde(rename_all = "camelCase")]
    JoinMeeting {
        meeting_id: MeetingId,
        user_id: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    LeaveMeeting {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    /// SDP offer addressed to one peer; the payload is opaque to the server.
    #[serde(rename_all = "camelCase")]
    WebrtcOffer {
        to: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    WebrtcAnswer {
        to: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    WebrtcIce {
        to: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    ScreenShareStarted {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    #[serde(rename_all = "camelCase")]
    ScreenShareStopped {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    /// Still-frame fallback for clients without a working peer link.
    #[serde(rename_all = "camelCase")]
    ScreenFrame { meeting_id: MeetingId, frame: String },
}

/// Frames the server pushes to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Acknowledges `connect`; after this the client may issue calls.
    #[serde(rename_all = "camelCase")]
    Connected { user_id: UserId, message: String },

    /// Reply to the joiner carrying everyone already in the meeting.
    #[serde(rename_all = "camelCase")]
    JoinedOk {
        meeting_id: MeetingId,
        participants: Vec<UserId>,
    },

    /// Told to every participant already present when someone new joins.
    #[serde(rename_all = "camelCase")]
    ParticipantJoined {
        meeting_id: MeetingId,
        user_id: UserId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    ParticipantLeft {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    /// Relayed negotiation traffic with the sender identity attached.
    #[serde(rename_all = "camelCase")]
    WebrtcOffer {
        from: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    WebrtcAnswer {
        from: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    WebrtcIce {
        from: UserId,
        payload: serde_json::Value,
    },

    #[serde(rename_all = "camelCase")]
    ScreenShareStarted {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    #[serde(rename_all = "camelCase")]
    ScreenShareStopped {
        meeting_id: MeetingId,
        user_id: UserId,
    },

    #[serde(rename_all = "camelCase")]
    ScreenFrame { meeting_id: MeetingId, frame: String },

    #[serde(rename_all = "camelCase")]
    ClassStarted {
        meeting_id: MeetingId,
        course_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        teacher_id: Option<UserId>,
    },

    #[serde(rename_all = "camelCase")]
    ClassEnded {
        meeting_id: MeetingId,
        course_code: String,
    },

    /// Broadcast when the screen-share flag is flipped through the HTTP
    /// surface. Clients filter by meeting id themselves.
    #[serde(rename_all = "camelCase")]
    ScreenShareUpdate {
        meeting_id: MeetingId,
        is_sharing: bool,
    },

    /// Pushed to the class owner when a student joins via HTTP.
    #[serde(rename_all = "camelCase")]
    StudentJoined {
        meeting_id: MeetingId,
        student_id: UserId,
        total_participants: usize,
    },

    #[serde(rename_all = "camelCase")]
    Approval { user_id: UserId, message: String },

    /// Last message a client sees before the server closes its connection.
    #[serde(rename_all = "camelCase")]
    AccountDeleted { user_id: UserId, message: String },
}
