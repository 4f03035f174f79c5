use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::{
    models::CollaborationSession,
    types::{ChatRequest, JoinSessionRequest, LeaveSessionRequest},
};
use crate::messages::ChatMessage;
use crate::shared::{AppError, AppState};

/// POST /api/projects/:project_id/session/join
#[instrument(name = "join_session", skip(state))]
pub async fn join_session(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Json<CollaborationSession>, AppError> {
    let session = state
        .session_registry
        .join(project_id, &request.user_id, &request.display_name)
        .await?;

    Ok(Json(session))
}

/// POST /api/projects/:project_id/session/leave
#[instrument(name = "leave_session", skip(state))]
pub async fn leave_session(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<LeaveSessionRequest>,
) -> Result<StatusCode, AppError> {
    state
        .session_registry
        .leave(project_id, &request.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/projects/:project_id/session
#[instrument(name = "active_session", skip(state))]
pub async fn active_session(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<CollaborationSession>, AppError> {
    state
        .session_registry
        .active_session(project_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound(format!("No active session for project {}", project_id))
        })
}

/// GET /api/projects/:project_id/sessions
#[instrument(name = "list_sessions", skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<CollaborationSession>>, AppError> {
    let sessions = state.session_registry.sessions(project_id).await?;

    info!(
        project_id = project_id,
        session_count = sessions.len(),
        "Sessions listed"
    );

    Ok(Json(sessions))
}

/// POST /api/projects/:project_id/chat
#[instrument(name = "send_chat", skip(state, request))]
pub async fn send_chat(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(request): Json<ChatRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), AppError> {
    let chat = state
        .chat_relay
        .send_chat_message(project_id, &request.user_id, &request.message)
        .await?;

    Ok((StatusCode::ACCEPTED, Json(chat)))
}
