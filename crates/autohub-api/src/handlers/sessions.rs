//! Session management handlers for the calling principal.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use autohub_core::error::AppError;

use crate::dto::response::{ApiResponse, MessageResponse, SessionResponse, TerminatedResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, ApiError> {
    let sessions = state.sessions.find_active_sessions(auth.principal_id).await?;
    let current = auth.session_id();

    Ok(Json(ApiResponse::ok(
        sessions
            .into_iter()
            .map(|s| SessionResponse::from_session(s, current))
            .collect(),
    )))
}

/// DELETE /api/sessions/{id}
pub async fn terminate_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    // Other principals' sessions look the same as missing ones.
    state
        .sessions
        .find(session_id)
        .await?
        .filter(|s| s.principal_id == auth.principal_id)
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    state.sessions.terminate(session_id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Session terminated",
    ))))
}

/// DELETE /api/sessions
///
/// Ends every session of the caller except the current one.
pub async fn terminate_other_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<TerminatedResponse>>, ApiError> {
    let terminated = state
        .sessions
        .terminate_all_except(auth.principal_id, auth.session_id())
        .await?;

    Ok(Json(ApiResponse::ok(TerminatedResponse { terminated })))
}
