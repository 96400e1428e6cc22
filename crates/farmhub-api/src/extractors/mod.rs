//! Request extractors.

pub mod auth;
pub mod client_meta;

pub use auth::{AuthUser, bearer_token};
pub use client_meta::ClientMeta;
