//! In-memory store implementations backed by `dashmap`.
//!
//! Every mutation happens under the owning shard's write lock, which gives
//! the same per-row atomicity the PostgreSQL repositories get from single
//! `UPDATE` statements.

pub mod principal;
pub mod session;
pub mod two_factor;

pub use principal::MemoryPrincipalStore;
pub use session::{MemorySessionStore, sweepable_ids};
pub use two_factor::MemoryTwoFactorStore;
