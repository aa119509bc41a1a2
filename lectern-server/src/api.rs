use crate::state::AppState;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use lectern_core::{MeetingId, SessionError, SessionSummary, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// HTTP control surface consumed by clients that do not hold an open
/// socket: class lifecycle, screen-share flag, and the notification
/// control points. Response bodies carry a success flag plus a
/// human-readable message.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/classes/active", get(list_active))
        .route("/api/classes/active/{meeting_id}", get(get_active))
        .route("/api/classes/start", post(start_class))
        .route("/api/classes/end", post(end_class))
        .route("/api/classes/join", post(join_class))
        .route("/api/classes/screen-share", post(set_screen_share))
        .route("/api/notify-approval", post(notify_approval))
        .route("/api/admin/evict", post(evict_user))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartClassRequest {
    pub course_code: String,
    pub meeting_id: MeetingId,
    pub teacher_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndClassRequest {
    pub meeting_id: MeetingId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassRequest {
    pub meeting_id: MeetingId,
    pub student_id: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenShareRequest {
    pub meeting_id: MeetingId,
    pub is_sharing: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub user_id: UserId,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvictRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionsResponse {
    pub success: bool,
    pub active_sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub session: Option<SessionSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinClassResponse {
    pub success: bool,
    pub message: String,
    pub class_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<usize>,
}

async fn list_active(State(state): State<Arc<AppState>>) -> Json<ActiveSessionsResponse> {
    Json(ActiveSessionsResponse {
        success: true,
        active_sessions: state.sessions.list_active(),
    })
}

async fn get_active(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<String>,
) -> Json<SessionResponse> {
    match state.sessions.get(&MeetingId::from(meeting_id)) {
        Some(session) => Json(SessionResponse {
            success: true,
            message: None,
            session: Some(session),
        }),
        None => Json(SessionResponse {
            success: false,
            message: Some("Class not found".into()),
            session: None,
        }),
    }
}

async fn start_class(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartClassRequest>,
) -> (StatusCode, Json<SessionResponse>) {
    match state
        .sessions
        .start(req.meeting_id, req.course_code, req.teacher_id)
    {
        Ok(session) => {
            state.notifier.class_started(&session);
            (
                StatusCode::OK,
                Json(SessionResponse {
                    success: true,
                    message: Some("Class session created".into()),
                    session: Some(session),
                }),
            )
        }
        Err(e @ SessionError::AlreadyActive(_)) => (
            StatusCode::CONFLICT,
            Json(SessionResponse {
                success: false,
                message: Some(e.to_string()),
                session: None,
            }),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(SessionResponse {
                success: false,
                message: Some(e.to_string()),
                session: None,
            }),
        ),
    }
}

async fn end_class(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EndClassRequest>,
) -> (StatusCode, Json<StatusResponse>) {
    match state.sessions.end(&req.meeting_id) {
        Ok(session) => {
            state.notifier.class_ended(&session);
            (
                StatusCode::OK,
                Json(StatusResponse {
                    success: true,
                    message: "Class session ended".into(),
                }),
            )
        }
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                success: false,
                message: "Class session not found".into(),
            }),
        ),
    }
}

async fn join_class(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JoinClassRequest>,
) -> Json<JoinClassResponse> {
    match state.sessions.join(&req.meeting_id, &req.student_id) {
        Ok(count) => {
            if let Some(teacher_id) = state.sessions.owner(&req.meeting_id) {
                state
                    .notifier
                    .student_joined(&teacher_id, &req.meeting_id, &req.student_id, count);
            }
            Json(JoinClassResponse {
                success: true,
                message: "Joined class".into(),
                class_active: true,
                participant_count: Some(count),
            })
        }
        Err(_) => Json(JoinClassResponse {
            success: false,
            message: "Class not active".into(),
            class_active: false,
            participant_count: None,
        }),
    }
}

async fn set_screen_share(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScreenShareRequest>,
) -> (StatusCode, Json<StatusResponse>) {
    match state
        .sessions
        .set_screen_sharing(&req.meeting_id, req.is_sharing)
    {
        Ok(is_sharing) => {
            state
                .notifier
                .screen_share_update(&req.meeting_id, is_sharing);
            let message = if is_sharing {
                "Screen sharing started"
            } else {
                "Screen sharing stopped"
            };
            (
                StatusCode::OK,
                Json(StatusResponse {
                    success: true,
                    message: message.into(),
                }),
            )
        }
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(StatusResponse {
                success: false,
                message: "Class session not found".into(),
            }),
        ),
    }
}

async fn notify_approval(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ApprovalRequest>,
) -> Json<StatusResponse> {
    // Delivery is best-effort; an offline user simply misses the push.
    state.notifier.approval(&req.user_id, req.message);
    Json(StatusResponse {
        success: true,
        message: "Notification sent to user".into(),
    })
}

async fn evict_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EvictRequest>,
) -> Json<StatusResponse> {
    let message = req
        .message
        .unwrap_or_else(|| "Your account has been deleted by an administrator.".into());
    state.notifier.account_deleted(&req.user_id, message);
    Json(StatusResponse {
        success: true,
        message: format!("User {} notified and disconnected", req.user_id),
    })
}
