//! JWT claims structure used in access and two-factor challenge tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Claim names owned by the token format; extra claims may not reuse them.
pub const RESERVED_CLAIMS: [&str; 6] = ["sub", "iat", "exp", "jti", "sid", "typ"];

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the principal ID.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
    /// Session this token belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<Uuid>,
    /// Token type.
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Caller-supplied claims.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Distinguishes access tokens from two-factor challenge tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Token accepted on authenticated API requests.
    Access,
    /// Short-lived token bridging the password step and the second factor.
    TwoFactor,
}

impl Claims {
    /// Returns the subject parsed as a principal ID.
    pub fn principal_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token has expired at `now`, allowing `leeway_seconds` of skew.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        now.timestamp() >= self.exp.saturating_add(leeway_seconds)
    }

    /// Looks up a claim by name, reserved or extra.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "sub" => Some(Value::String(self.sub.clone())),
            "iat" => Some(Value::from(self.iat)),
            "exp" => Some(Value::from(self.exp)),
            "jti" => Some(Value::String(self.jti.to_string())),
            "sid" => self.sid.map(|sid| Value::String(sid.to_string())),
            "typ" => serde_json::to_value(self.token_type).ok(),
            other => self.extra.get(other).cloned(),
        }
    }
}
