//! # autohub-database
//!
//! Persistence for the authentication core. The [`store`] module defines
//! the narrow async interfaces the core depends on; [`memory`] implements
//! them over concurrent maps and [`repositories`] implements them on
//! PostgreSQL with per-row atomic updates.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryPrincipalStore, MemorySessionStore, MemoryTwoFactorStore};
pub use repositories::{PrincipalRepository, SessionRepository, TwoFactorRepository};
pub use store::{PrincipalStore, SessionStore, TwoFactorStore};
