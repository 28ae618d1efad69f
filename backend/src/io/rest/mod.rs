//! # REST API Interface Layer
//!
//! HTTP endpoints of the memorial service. This layer handles:
//! - JSON request/response serialization
//! - Error translation from domain errors to HTTP status codes
//! - The session guard in front of the admin routes
//!
//! All failures are caught here and rendered as `ErrorResponse` bodies.

pub mod admin_apis;
pub mod auth_apis;
pub mod errors;
pub mod mappers;
pub mod memorial_apis;

#[cfg(test)]
pub(crate) mod test_support;
