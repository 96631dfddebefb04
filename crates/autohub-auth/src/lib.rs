//! # autohub-auth
//!
//! Authentication and session security for the AutoHub identity service.
//!
//! ## Modules
//!
//! - `token`: bearer token issuance, verification and the verification cache
//! - `session`: session lifecycle (create, touch, terminate, sweep)
//! - `lockout`: failed-login counters and account locks
//! - `two_factor`: TOTP enrollment, backup codes and second-factor checks
//! - `rate_limit`: per-client token buckets by endpoint category
//! - `password`: Argon2id credential verification
//! - `login`: the login flow tying the pieces together

pub mod lockout;
pub mod login;
pub mod password;
pub mod rate_limit;
pub mod session;
pub mod token;
pub mod two_factor;

pub use lockout::{LockStatus, LockoutGuard};
pub use login::{ClientInfo, EstablishedSession, LoginFlow, LoginOutcome, SecondFactorOutcome};
pub use password::{CredentialVerifier, PasswordHasher};
pub use rate_limit::{RateBuckets, RateCategory, RateDecision, RateLimiter};
pub use session::SessionRegistry;
pub use token::{Claims, IssuedToken, TokenAuthority, TokenType, VerificationCache};
pub use two_factor::{Enrollment, TwoFactorAuth};
