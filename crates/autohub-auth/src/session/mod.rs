//! Session lifecycle management.

pub mod registry;

pub use registry::SessionRegistry;
