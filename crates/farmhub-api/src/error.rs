//! HTTP error mapping for the API layer.
//!
//! The `IntoResponse for AppError` impl and its response envelope live in
//! `farmhub-core` (the crate that defines `AppError`) because Rust's orphan
//! rule forbids implementing the foreign `IntoResponse` trait for the foreign
//! `AppError` type here. They are re-exported so existing `crate::error::*`
//! paths keep resolving.

pub use farmhub_core::http_error::{ApiErrorBody, ApiErrorResponse};
