//! Built-in sweep jobs.

pub mod rate_buckets;
pub mod sessions;
pub mod token_cache;

pub use rate_buckets::RateBucketResetJob;
pub use sessions::SessionSweepJob;
pub use token_cache::TokenCacheSweepJob;
