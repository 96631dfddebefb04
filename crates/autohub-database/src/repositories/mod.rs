//! PostgreSQL repository implementations of the store traits.

pub mod principal;
pub mod session;
pub mod two_factor;

pub use principal::PrincipalRepository;
pub use session::SessionRepository;
pub use two_factor::TwoFactorRepository;
