//! Per-(email, IP) login attempt limiting.

pub mod limiter;

pub use limiter::{FailureOutcome, LoginAttemptLimiter};
