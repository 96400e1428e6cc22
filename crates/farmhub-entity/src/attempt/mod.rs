//! Login attempt tracking entities.

pub mod model;

pub use model::LoginAttempt;
