//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use autohub_auth::{
    CredentialVerifier, LockoutGuard, LoginFlow, RateBuckets, RateLimiter, SessionRegistry,
    TokenAuthority, TwoFactorAuth, VerificationCache,
};
use autohub_core::config::AppConfig;
use autohub_core::traits::Clock;
use autohub_database::{
    DatabasePool, MemoryPrincipalStore, MemorySessionStore, MemoryTwoFactorStore,
    PrincipalRepository, PrincipalStore, SessionRepository, SessionStore, TwoFactorRepository,
    TwoFactorStore,
};

/// The persistence backends the services run on.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Principals and lockout counters.
    pub principals: Arc<dyn PrincipalStore>,
    /// Sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Two-factor profiles.
    pub two_factor: Arc<dyn TwoFactorStore>,
}

impl Stores {
    /// Process-local stores over concurrent maps.
    pub fn in_memory() -> Self {
        Self {
            principals: Arc::new(MemoryPrincipalStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            two_factor: Arc::new(MemoryTwoFactorStore::new()),
        }
    }

    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        Self {
            principals: Arc::new(PrincipalRepository::new(db.pool().clone())),
            sessions: Arc::new(SessionRepository::new(db.pool().clone())),
            two_factor: Arc::new(TwoFactorRepository::new(db.pool().clone())),
        }
    }
}

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Time source shared by every service
    pub clock: Arc<dyn Clock>,

    // ── Persistence ──────────────────────────────────────────
    /// Principal store
    pub principals: Arc<dyn PrincipalStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token issuance and verification
    pub tokens: Arc<TokenAuthority>,
    /// Session lifecycle
    pub sessions: Arc<SessionRegistry>,
    /// Second factor
    pub two_factor: Arc<TwoFactorAuth>,
    /// Password and second-factor login steps
    pub login: LoginFlow,
    /// Per-client request gate
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Wire every service over the given stores.
    pub fn new(
        config: AppConfig,
        stores: Stores,
        credentials: Arc<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(VerificationCache::new(config.auth.cache_entries_per_subject));
        let tokens = Arc::new(TokenAuthority::new(&config.auth, cache, Arc::clone(&clock)));
        let sessions = Arc::new(SessionRegistry::new(
            &config.session,
            Arc::clone(&stores.sessions),
            Arc::clone(&clock),
        ));
        let lockout = Arc::new(LockoutGuard::new(
            &config.lockout,
            Arc::clone(&stores.principals),
            Arc::clone(&clock),
        ));
        let two_factor = Arc::new(TwoFactorAuth::new(
            config.two_factor.clone(),
            Arc::clone(&stores.two_factor),
            Arc::clone(&clock),
        ));
        let login = LoginFlow::new(
            Arc::clone(&stores.principals),
            credentials,
            lockout,
            Arc::clone(&sessions),
            Arc::clone(&tokens),
            Arc::clone(&two_factor),
        );
        let rate_limiter = RateLimiter::new(Arc::new(RateBuckets::new()), Arc::clone(&clock));

        Self {
            config: Arc::new(config),
            clock,
            principals: stores.principals,
            tokens,
            sessions,
            two_factor,
            login,
            rate_limiter,
        }
    }
}
