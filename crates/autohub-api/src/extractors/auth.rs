//! `AuthUser` extractor: pulls the bearer token from the Authorization header,
//! verifies it and binds the request to a live session.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use autohub_auth::Claims;
use autohub_core::error::AppError;
use autohub_entity::session::Session;

use crate::error::ApiError;
use crate::extractors::client::{client_ip, user_agent};
use crate::state::AppState;

/// Authenticated principal and the session the request belongs to.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Principal the token was issued to.
    pub principal_id: Uuid,
    /// Session, already touched for this request.
    pub session: Session,
    /// Verified token claims.
    pub claims: Claims,
}

impl AuthUser {
    /// Id of the current session.
    pub fn session_id(&self) -> Uuid {
        self.session.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state
            .tokens
            .authenticate(token)
            .ok_or_else(|| AppError::authentication("Invalid or expired token"))?;
        let principal_id = claims
            .principal_id()
            .ok_or_else(|| AppError::authentication("Invalid or expired token"))?;

        let session = match claims.sid {
            Some(session_id) => {
                let now = state.clock.now();
                state
                    .sessions
                    .find(session_id)
                    .await?
                    .filter(|s| s.principal_id == principal_id && s.is_valid_at(now))
                    .ok_or_else(|| AppError::session("Session expired or terminated"))?;
                state
                    .sessions
                    .touch(session_id)
                    .await?
                    .ok_or_else(|| AppError::session("Session expired or terminated"))?
            }
            None => {
                let ip = client_ip(
                    &parts.headers,
                    &parts.extensions,
                    state.config.rate_limit.trust_forwarded_for,
                );
                let agent = user_agent(&parts.headers);
                state
                    .sessions
                    .resume_or_open(principal_id, &ip, agent.as_deref())
                    .await?
            }
        };

        tracing::trace!(
            principal_id = %principal_id,
            session_id = %session.id,
            "Request authenticated"
        );

        Ok(AuthUser {
            principal_id,
            session,
            claims,
        })
    }
}
