//! HTTP error surface for the handler layer.

mod http_error;
mod pg_error;

pub use http_error::{Error, ErrorKind, Result};
