//! # farmhub-api
//!
//! HTTP API layer for the Farmhub auth service: Axum router, application
//! state, request/response DTOs, extractors, middleware, and the mapping
//! from [`farmhub_core::AppError`] to HTTP responses.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
