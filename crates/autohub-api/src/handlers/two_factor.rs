//! Two-factor enrollment handlers for the calling principal.

use axum::Json;
use axum::extract::State;

use autohub_core::error::AppError;

use crate::dto::request::ConfirmTwoFactorRequest;
use crate::dto::response::{ApiResponse, EnrollmentResponse, TwoFactorStatusResponse};
use crate::dto::validated;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/account/2fa/setup
///
/// Stages a new secret; an enabled factor stays in force until confirmed.
pub async fn setup(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<EnrollmentResponse>>, ApiError> {
    let principal = state
        .principals
        .find_by_id(auth.principal_id)
        .await?
        .ok_or_else(|| AppError::not_found("Principal not found"))?;

    let enrollment = state
        .two_factor
        .begin_enrollment(principal.id, &principal.identifier)
        .await?;

    Ok(Json(ApiResponse::ok(EnrollmentResponse::from(enrollment))))
}

/// POST /api/account/2fa/confirm
pub async fn confirm(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ConfirmTwoFactorRequest>,
) -> Result<Json<ApiResponse<TwoFactorStatusResponse>>, ApiError> {
    let req = validated(req)?;

    let confirmed = state
        .two_factor
        .confirm_enrollment(auth.principal_id, &req.secret, &req.code)
        .await?;
    if !confirmed {
        return Err(AppError::validation("Invalid verification code").into());
    }

    Ok(Json(ApiResponse::ok(TwoFactorStatusResponse { enabled: true })))
}

/// POST /api/account/2fa/disable
pub async fn disable(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<TwoFactorStatusResponse>>, ApiError> {
    state.two_factor.disable(auth.principal_id).await?;

    Ok(Json(ApiResponse::ok(TwoFactorStatusResponse { enabled: false })))
}
