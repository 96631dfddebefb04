//! Per-client rate limiting by endpoint category.

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use autohub_auth::RateCategory;
use autohub_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::client_ip;
use crate::state::AppState;

/// Tokens left in the client's bucket.
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
/// Seconds until the next token, sent on refusal.
pub const RETRY_AFTER_HEADER: &str = "x-rate-limit-retry-after-seconds";

/// Consumes one token for the request's `(client, category)` bucket.
///
/// Static assets pass untouched. A refused request gets a 429 and never
/// reaches the handler.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(category) = RateCategory::for_path(request.uri().path()) else {
        return next.run(request).await;
    };

    let ip = client_ip(
        request.headers(),
        request.extensions(),
        state.config.rate_limit.trust_forwarded_for,
    );
    let decision = state.rate_limiter.try_consume(&ip, category);

    if !decision.allowed {
        let mut response = ApiError::from(AppError::rate_limit("Too many requests"))
            .with_details(serde_json::json!({
                "category": category.as_str(),
                "retry_after_seconds": decision.retry_after_seconds,
            }))
            .into_response();
        let headers = response.headers_mut();
        headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
        headers.insert(
            RETRY_AFTER_HEADER,
            HeaderValue::from(decision.retry_after_seconds),
        );
        return response;
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    response
}
