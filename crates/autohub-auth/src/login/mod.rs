//! Password login with lockout and optional second factor.

pub mod flow;
pub mod outcome;

pub use flow::LoginFlow;
pub use outcome::{ClientInfo, EstablishedSession, LoginOutcome, SecondFactorOutcome};
