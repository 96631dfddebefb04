//! Login flow: lockout check, credential verification, counter update,
//! then a session or a second-factor challenge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use autohub_core::error::AppError;
use autohub_core::result::AppResult;
use autohub_database::store::PrincipalStore;

use crate::lockout::{LockStatus, LockoutGuard};
use crate::password::CredentialVerifier;
use crate::session::SessionRegistry;
use crate::token::TokenAuthority;
use crate::two_factor::TwoFactorAuth;

use super::outcome::{ClientInfo, EstablishedSession, LoginOutcome, SecondFactorOutcome};

/// Runs password logins and the second-factor step.
///
/// Attempts for the same identifier are serialized, so the lock check,
/// the credential check and the counter update behave as one unit.
#[derive(Clone)]
pub struct LoginFlow {
    /// Principal lookup.
    principals: Arc<dyn PrincipalStore>,
    /// Password check.
    credentials: Arc<dyn CredentialVerifier>,
    /// Failed-login policy.
    lockout: Arc<LockoutGuard>,
    /// Session creation.
    sessions: Arc<SessionRegistry>,
    /// Token issuance.
    tokens: Arc<TokenAuthority>,
    /// Second factor.
    two_factor: Arc<TwoFactorAuth>,
    /// One gate per identifier with an attempt in flight.
    in_flight: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl LoginFlow {
    /// Creates the flow from its collaborators.
    pub fn new(
        principals: Arc<dyn PrincipalStore>,
        credentials: Arc<dyn CredentialVerifier>,
        lockout: Arc<LockoutGuard>,
        sessions: Arc<SessionRegistry>,
        tokens: Arc<TokenAuthority>,
        two_factor: Arc<TwoFactorAuth>,
    ) -> Self {
        Self {
            principals,
            credentials,
            lockout,
            sessions,
            tokens,
            two_factor,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Performs the password step.
    ///
    /// 1. Refuse locked or banned identifiers
    /// 2. Verify the password (against a dummy hash for unknown identifiers)
    /// 3. Record a failure
    /// 4. Refuse accounts whose status forbids login
    /// 5. Reset the counter
    /// 6. Issue a challenge token or open a session
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: &ClientInfo,
    ) -> AppResult<LoginOutcome> {
        let key = identifier.trim().to_lowercase();
        let gate = self.gate(&key);
        let outcome = {
            let _held = gate.lock().await;
            self.password_step(identifier.trim(), password, client).await
        };
        drop(gate);
        self.release(&key);
        outcome
    }

    /// Performs the second-factor step with a challenge token.
    ///
    /// A wrong code counts as a failed login for the principal's identifier.
    pub async fn complete_two_factor(
        &self,
        challenge: &str,
        code: &str,
        is_backup_code: bool,
        client: &ClientInfo,
    ) -> AppResult<SecondFactorOutcome> {
        let Some(principal_id) = self
            .tokens
            .verify_two_factor(challenge)
            .and_then(|subject| Uuid::parse_str(&subject).ok())
        else {
            return Ok(SecondFactorOutcome::InvalidChallenge);
        };
        let Some(principal) = self.principals.find_by_id(principal_id).await? else {
            return Ok(SecondFactorOutcome::InvalidChallenge);
        };

        let key = principal.identifier.to_lowercase();
        let gate = self.gate(&key);
        let outcome = {
            let _held = gate.lock().await;
            self.second_factor_step(principal_id, &principal.identifier, code, is_backup_code, client)
                .await
        };
        drop(gate);
        self.release(&key);
        outcome
    }

    async fn password_step(
        &self,
        identifier: &str,
        password: &str,
        client: &ClientInfo,
    ) -> AppResult<LoginOutcome> {
        if let LockStatus::Locked { until } = self.lockout.status(identifier).await? {
            info!(client_ip = %client.ip_address, "Login refused for locked account");
            return Ok(LoginOutcome::Locked {
                locked_until: until,
            });
        }

        let principal = self.principals.find_by_identifier(identifier).await?;
        let stored = principal.as_ref().map(|p| p.password_hash.clone());
        let valid = self.check_password(password, stored).await?;

        let Some(principal) = principal else {
            info!(client_ip = %client.ip_address, "Login failed");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        if !valid {
            warn!(principal_id = %principal.id, client_ip = %client.ip_address, "Login failed");
            if self.lockout.record_failure(identifier).await? {
                return Ok(LoginOutcome::Locked {
                    locked_until: self.locked_until(identifier).await?,
                });
            }
            return Ok(LoginOutcome::InvalidCredentials);
        }

        if !principal.status.can_login() {
            info!(principal_id = %principal.id, status = %principal.status, "Login refused for account status");
            return Ok(LoginOutcome::AccountDisabled);
        }

        self.lockout.record_success(identifier).await?;

        if self.two_factor.is_enabled(principal.id).await? {
            let challenge = self.tokens.issue_two_factor(&principal.id.to_string())?;
            info!(principal_id = %principal.id, "Password accepted, second factor required");
            return Ok(LoginOutcome::TwoFactorRequired { challenge });
        }

        Ok(LoginOutcome::Authenticated(
            self.establish(principal.id, client).await?,
        ))
    }

    async fn second_factor_step(
        &self,
        principal_id: Uuid,
        identifier: &str,
        code: &str,
        is_backup_code: bool,
        client: &ClientInfo,
    ) -> AppResult<SecondFactorOutcome> {
        if let LockStatus::Locked { until } = self.lockout.status(identifier).await? {
            return Ok(SecondFactorOutcome::Locked {
                locked_until: until,
            });
        }

        if !self
            .two_factor
            .verify(principal_id, code, is_backup_code)
            .await?
        {
            warn!(principal_id = %principal_id, client_ip = %client.ip_address, "Second factor rejected");
            if self.lockout.record_failure(identifier).await? {
                return Ok(SecondFactorOutcome::Locked {
                    locked_until: self.locked_until(identifier).await?,
                });
            }
            return Ok(SecondFactorOutcome::InvalidCode);
        }

        self.lockout.record_success(identifier).await?;
        Ok(SecondFactorOutcome::Authenticated(
            self.establish(principal_id, client).await?,
        ))
    }

    /// Runs the credential check on the blocking pool.
    async fn check_password(&self, password: &str, stored: Option<String>) -> AppResult<bool> {
        let verifier = self.credentials.clone();
        let presented = password.to_string();
        tokio::task::spawn_blocking(move || match stored {
            Some(stored) => verifier.verify(&presented, &stored),
            None => verifier.verify_absent(&presented),
        })
        .await
        .map_err(|e| AppError::internal(format!("Credential verification task failed: {e}")))?
    }

    async fn establish(&self, principal_id: Uuid, client: &ClientInfo) -> AppResult<EstablishedSession> {
        let session = self
            .sessions
            .open_for_client(principal_id, &client.ip_address, client.user_agent.as_deref())
            .await?;
        let access_token = self
            .tokens
            .issue_for_session(&principal_id.to_string(), session.id)?;

        info!(principal_id = %principal_id, session_id = %session.id, "Login succeeded");
        Ok(EstablishedSession {
            principal_id,
            session,
            access_token,
        })
    }

    async fn locked_until(&self, identifier: &str) -> AppResult<Option<DateTime<Utc>>> {
        Ok(match self.lockout.status(identifier).await? {
            LockStatus::Locked { until } => until,
            LockStatus::Unlocked => None,
        })
    }

    fn gate(&self, key: &str) -> Arc<Mutex<()>> {
        self.in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    fn release(&self, key: &str) {
        self.in_flight
            .remove_if(key, |_, gate| Arc::strong_count(gate) == 1);
    }
}
