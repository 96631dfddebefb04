//! # autohub-core
//!
//! Core crate for the AutoHub identity service. Contains configuration
//! schemas, the clock abstraction used for every expiry comparison, and
//! the unified error system.
//!
//! This crate has **no** internal dependencies on other AutoHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
pub use traits::{Clock, ManualClock, SystemClock};
