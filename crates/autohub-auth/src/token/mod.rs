//! Bearer token issuance and verification.

pub mod authority;
pub mod cache;
pub mod claims;

pub use authority::{IssuedToken, TokenAuthority};
pub use cache::{CachedVerification, VerificationCache};
pub use claims::{Claims, TokenType};
