//! # farmhub-core
//!
//! Core crate for Farmhub. Contains configuration schemas and the unified
//! error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other Farmhub crates.

pub mod config;
pub mod error;
pub mod http_error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
