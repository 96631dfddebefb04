//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every section can be omitted in favour of its defaults.

pub mod app;
pub mod auth;
pub mod database;
pub mod lockout;
pub mod logging;
pub mod rate_limit;
pub mod session;
pub mod two_factor;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::database::DatabaseConfig;
use self::lockout::LockoutConfig;
use self::logging::LoggingConfig;
use self::rate_limit::RateLimitConfig;
use self::session::SessionConfig;
use self::two_factor::TwoFactorConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token signing and verification-cache settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Failed-login lockout policy.
    #[serde(default)]
    pub lockout: LockoutConfig,
    /// Two-factor enrollment settings.
    #[serde(default)]
    pub two_factor: TwoFactorConfig,
    /// Request rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `AUTOHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("AUTOHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would make the security policies meaningless.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.len() < 32 {
            return Err(AppError::configuration(
                "auth.jwt_secret must be at least 32 bytes long",
            ));
        }
        if self.auth.token_validity_seconds == 0 {
            return Err(AppError::configuration(
                "auth.token_validity_seconds must be positive",
            ));
        }
        if self.auth.cache_entries_per_subject == 0 {
            return Err(AppError::configuration(
                "auth.cache_entries_per_subject must be positive",
            ));
        }
        if self.auth.cache_sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "auth.cache_sweep_interval_seconds must be positive",
            ));
        }
        if self.session.expiry_hours == 0 {
            return Err(AppError::configuration(
                "session.expiry_hours must be positive",
            ));
        }
        if self.session.sweep_interval_minutes == 0 {
            return Err(AppError::configuration(
                "session.sweep_interval_minutes must be positive",
            ));
        }
        if self.rate_limit.reset_interval_minutes == 0 {
            return Err(AppError::configuration(
                "rate_limit.reset_interval_minutes must be positive",
            ));
        }
        if self.lockout.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "lockout.max_failed_attempts must be positive",
            ));
        }
        if self.two_factor.issuer.contains(':') {
            return Err(AppError::configuration(
                "two_factor.issuer must not contain ':'",
            ));
        }
        Ok(())
    }
}
