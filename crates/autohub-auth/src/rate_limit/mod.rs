//! Per-client token-bucket rate limiting by endpoint category.

pub mod bucket;
pub mod category;
pub mod limiter;

pub use bucket::{RateDecision, TokenBucket};
pub use category::RateCategory;
pub use limiter::{RateBuckets, RateLimiter};
