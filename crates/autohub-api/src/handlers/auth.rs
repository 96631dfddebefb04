//! Auth handlers: login, second factor, logout.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};

use autohub_auth::{LoginOutcome, SecondFactorOutcome};
use autohub_core::error::AppError;

use crate::dto::request::{LoginRequest, TwoFactorVerifyRequest};
use crate::dto::response::{ApiResponse, LoginResponse, MessageResponse};
use crate::dto::validated;
use crate::error::ApiError;
use crate::extractors::{AuthUser, Client};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: Client,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let req = validated(req)?;

    let response = match state.login.login(&req.identifier, &req.password, &client).await? {
        LoginOutcome::Authenticated(established) => LoginResponse::from(established),
        LoginOutcome::TwoFactorRequired { challenge } => LoginResponse::challenge(challenge),
        LoginOutcome::InvalidCredentials => {
            return Err(AppError::authentication("Invalid credentials").into());
        }
        LoginOutcome::Locked { locked_until } => return Err(locked(locked_until)),
        LoginOutcome::AccountDisabled => {
            return Err(AppError::authorization("Account is not active").into());
        }
    };

    Ok(Json(ApiResponse::ok(response)))
}

/// POST /api/auth/2fa/verify
pub async fn verify_two_factor(
    State(state): State<AppState>,
    client: Client,
    Json(req): Json<TwoFactorVerifyRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let req = validated(req)?;

    let outcome = state
        .login
        .complete_two_factor(&req.challenge_token, &req.code, req.backup_code, &client)
        .await?;

    match outcome {
        SecondFactorOutcome::Authenticated(established) => {
            Ok(Json(ApiResponse::ok(LoginResponse::from(established))))
        }
        SecondFactorOutcome::InvalidChallenge => {
            Err(AppError::authentication("Invalid or expired challenge token").into())
        }
        SecondFactorOutcome::InvalidCode => {
            Err(AppError::two_factor("Invalid verification code").into())
        }
        SecondFactorOutcome::Locked { locked_until } => Err(locked(locked_until)),
    }
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.sessions.terminate(auth.session_id()).await?;

    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Logged out successfully",
    ))))
}

fn locked(locked_until: Option<DateTime<Utc>>) -> ApiError {
    let message = if locked_until.is_some() {
        "Account is temporarily locked"
    } else {
        "Account is banned"
    };
    ApiError::from(AppError::account_locked(message))
        .with_details(serde_json::json!({ "locked_until": locked_until }))
}
