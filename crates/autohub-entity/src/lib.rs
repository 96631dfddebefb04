//! # autohub-entity
//!
//! Domain entity models for the AutoHub identity service. Every struct in
//! this crate represents a database table row or a domain value object.
//! Entities are immutable in spirit: state transitions are methods that
//! return a new value and leave the receiver untouched, so a caller holding
//! an older copy never observes a later change.

pub mod principal;
pub mod session;
pub mod two_factor;
