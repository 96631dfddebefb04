//! Principal (user account) domain entities.

pub mod lockout;
pub mod model;
pub mod status;

pub use lockout::LockoutState;
pub use model::{CreatePrincipal, Principal};
pub use status::PrincipalStatus;
