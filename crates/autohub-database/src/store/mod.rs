//! Storage interfaces consumed by the authentication core.

pub mod principal;
pub mod session;
pub mod two_factor;

pub use principal::PrincipalStore;
pub use session::SessionStore;
pub use two_factor::TwoFactorStore;
