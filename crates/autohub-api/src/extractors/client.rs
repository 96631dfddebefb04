//! Client address and user agent of the current request.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};

use autohub_auth::ClientInfo;

use crate::error::ApiError;
use crate::state::AppState;

/// Fallback when neither the forwarding header nor the peer address is known.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolve the client address.
///
/// With `trust_forwarded_for`, the first non-empty `X-Forwarded-For` entry
/// wins; otherwise the peer address of the connection is used.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// `User-Agent` header value, if readable.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// Extracted client address and user agent.
#[derive(Debug, Clone)]
pub struct Client(pub ClientInfo);

impl std::ops::Deref for Client {
    type Target = ClientInfo;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Client {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(
            &parts.headers,
            &parts.extensions,
            state.config.rate_limit.trust_forwarded_for,
        );
        Ok(Client(ClientInfo::new(ip, user_agent(&parts.headers))))
    }
}
