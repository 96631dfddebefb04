//! Token issuance and cached verification.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use autohub_core::config::auth::AuthConfig;
use autohub_core::error::AppError;
use autohub_core::result::AppResult;
use autohub_core::traits::Clock;

use super::cache::VerificationCache;
use super::claims::{Claims, RESERVED_CLAIMS, TokenType};

/// A freshly signed token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Unique token ID.
    pub jti: Uuid,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Issues HS256 tokens and verifies them through a per-subject cache.
///
/// Expiry is always compared against the injected [`Clock`], never against
/// the system time, so the signature check and the expiry check are
/// separate steps.
pub struct TokenAuthority {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Signature and structure validation (expiry is checked separately).
    validation: Validation,
    /// Access token lifetime.
    validity: Duration,
    /// Two-factor challenge token lifetime.
    two_factor_validity: Duration,
    /// Tolerated clock skew in seconds.
    leeway_seconds: i64,
    /// Successful verifications.
    cache: Arc<VerificationCache>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("validity", &self.validity)
            .field("two_factor_validity", &self.two_factor_validity)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl TokenAuthority {
    /// Creates a token authority from auth configuration.
    pub fn new(config: &AuthConfig, cache: Arc<VerificationCache>, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            validity: Duration::seconds(config.token_validity_seconds as i64),
            two_factor_validity: Duration::seconds(config.two_factor_token_validity_seconds as i64),
            leeway_seconds: config.leeway_seconds as i64,
            cache,
            clock,
        }
    }

    /// Returns the verification cache.
    pub fn cache(&self) -> &Arc<VerificationCache> {
        &self.cache
    }

    /// Issues an access token for `subject` carrying `extra` claims.
    ///
    /// Extra claims that collide with a reserved claim name are dropped.
    pub fn issue(&self, subject: &str, extra: Map<String, Value>) -> AppResult<IssuedToken> {
        self.sign(subject, None, TokenType::Access, self.validity, extra)
    }

    /// Issues an access token bound to a session.
    pub fn issue_for_session(&self, subject: &str, session_id: Uuid) -> AppResult<IssuedToken> {
        self.sign(
            subject,
            Some(session_id),
            TokenType::Access,
            self.validity,
            Map::new(),
        )
    }

    /// Issues a short-lived challenge token for the second login step.
    pub fn issue_two_factor(&self, subject: &str) -> AppResult<IssuedToken> {
        self.sign(
            subject,
            None,
            TokenType::TwoFactor,
            self.two_factor_validity,
            Map::new(),
        )
    }

    /// Verifies an access token against the expected subject.
    ///
    /// Fails closed on a bad signature, malformed structure, expiry, subject
    /// mismatch or wrong token type. A cached verification for
    /// `(expected_subject, token)` that has not expired is accepted without
    /// re-checking the signature. Only successful results are cached.
    pub fn verify(&self, token: &str, expected_subject: &str) -> bool {
        let now = self.clock.now();
        if self.cache.lookup(expected_subject, token, now.timestamp()) {
            return true;
        }

        let claims = match self.decode(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Token verification failed");
                return false;
            }
        };

        if claims.token_type != TokenType::Access {
            debug!(jti = %claims.jti, "Rejected non-access token");
            return false;
        }
        if claims.sub != expected_subject {
            debug!(jti = %claims.jti, "Token subject mismatch");
            return false;
        }
        if claims.is_expired_at(now, self.leeway_seconds) {
            debug!(jti = %claims.jti, "Token has expired");
            return false;
        }

        self.cache.insert(
            expected_subject,
            token,
            claims.exp.saturating_add(self.leeway_seconds),
        );
        true
    }

    /// Verifies a two-factor challenge token and returns its subject.
    ///
    /// Challenge tokens are never cached.
    pub fn verify_two_factor(&self, token: &str) -> Option<String> {
        let claims = self.decode(token).ok()?;
        if claims.token_type != TokenType::TwoFactor
            || claims.is_expired_at(self.clock.now(), self.leeway_seconds)
        {
            return None;
        }
        Some(claims.sub)
    }

    /// Verifies a token against its own subject and returns its claims.
    ///
    /// The payload is read unverified only to find the subject; the claims are
    /// returned only when [`verify`](Self::verify) accepts that exact token
    /// string, either from the cache or after a full signature check.
    pub fn authenticate(&self, token: &str) -> Option<Claims> {
        let claims = insecure_decode::<Claims>(token).ok()?.claims;
        self.verify(token, &claims.sub).then_some(claims)
    }

    /// Extracts the subject without touching the cache.
    ///
    /// The signature is checked but expiry is not, so a successful parse does
    /// not mean the token is valid.
    pub fn extract_subject(&self, token: &str) -> AppResult<String> {
        Ok(self.decode(token)?.sub)
    }

    /// Extracts a single claim without touching the cache.
    ///
    /// Same caveat as [`extract_subject`](Self::extract_subject).
    pub fn extract_claim(&self, token: &str, name: &str) -> AppResult<Option<Value>> {
        Ok(self.decode(token)?.get(name))
    }

    /// Drops cached verifications whose token has expired.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.cache.sweep(self.clock.now().timestamp());
        if removed > 0 {
            debug!(removed = removed, "Swept expired token verifications");
        }
        removed
    }

    fn sign(
        &self,
        subject: &str,
        sid: Option<Uuid>,
        token_type: TokenType,
        validity: Duration,
        mut extra: Map<String, Value>,
    ) -> AppResult<IssuedToken> {
        extra.retain(|name, _| !RESERVED_CLAIMS.contains(&name.as_str()));

        let now = self.clock.now();
        let issued_at = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at,
            exp: issued_at + validity.num_seconds(),
            jti: Uuid::new_v4(),
            sid,
            token_type,
            extra,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode token: {e}")))?;
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| AppError::internal("Token expiry out of range"))?;

        Ok(IssuedToken {
            token,
            jti: claims.jti,
            expires_at,
        })
    }

    fn decode(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                _ => AppError::authentication(format!("Malformed token: {e}")),
            })
    }
}
