//! Background sweep tasks for AutoHub.
//!
//! This crate provides:
//! - The [`SweepJob`] trait for periodic housekeeping off the request path
//! - A [`SweepRunner`] that drives one ticker task per job until shutdown
//! - Built-in jobs for the token verification cache, sessions and rate buckets

pub mod job;
pub mod jobs;
pub mod runner;

pub use job::{SweepError, SweepJob};
pub use runner::SweepRunner;
