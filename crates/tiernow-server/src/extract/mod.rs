//! HTTP request extractors with improved error handling.
//!
//! Drop-in replacements for the standard axum extractors that convert
//! rejections into this API's error responses instead of plain-text
//! bodies.

pub mod reject;

pub use crate::extract::reject::{Json, Path, ValidateJson};
