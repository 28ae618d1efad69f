//! # Domain Module
//!
//! Business logic of the memorial service, independent of HTTP and of the
//! storage backend.
//!
//! ## Module Organization
//!
//! - **models**: The memorial record, its code, dates and ownership scopes
//! - **memorial_service**: Record store client (CRUD and queries per scope)
//! - **memorial_list**: Search, filter and sort of the public listing
//! - **date_format**: Normalization and pt-BR rendering of memorial dates
//! - **validation**: Field-level checks for admin writes
//! - **image_service**: Upload to data URI conversion and placeholder covers
//! - **auth_service**: Admin sign-in and bearer sessions
//!
//! ## Business Rules
//!
//! - Memorial codes are always stored and matched with a `#` prefix
//! - Records without a name never appear in the public listing
//! - Calendar dates are displayed as stored, with no timezone shift
//! - A record lives in exactly one scope, chosen by the ownership scheme

pub mod auth_service;
pub mod date_format;
pub mod errors;
pub mod image_service;
pub mod memorial_list;
pub mod memorial_service;
pub mod models;
pub mod validation;

pub use auth_service::{AuthService, Credential, Principal, Session};
pub use date_format::{DateFormatter, DateStyle, DisplayLocale};
pub use errors::{FieldError, MemorialError};
pub use image_service::ImageService;
pub use memorial_list::{ListCriteria, MemorialListView};
pub use memorial_service::MemorialService;
