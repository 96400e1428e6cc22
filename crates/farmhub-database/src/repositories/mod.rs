//! Database repositories, one per table.

pub mod login_attempt;
pub mod refresh_token;
pub mod revoked_token;
pub mod security_event;
pub mod user;
