//! Serializable HTTP error responses.

use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// HTTP error response representation.
///
/// Contains everything needed to serialize an error response: the error
/// name, a user-facing message, the HTTP status code, and optional
/// resource/context information.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse<'a> {
    /// The error name/type identifier
    pub name: Cow<'a, str>,
    /// User-friendly error message safe for client display
    pub message: Cow<'a, str>,
    /// The resource that the error relates to (optional, set by handler)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Internal context for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    /// HTTP status code (not serialized in JSON)
    #[serde(skip)]
    pub status: StatusCode,
}

impl<'a> ErrorResponse<'a> {
    // 4xx Client Errors
    pub const BAD_REQUEST: Self = Self::new(
        "bad_request",
        "The request could not be processed due to invalid data",
        StatusCode::BAD_REQUEST,
    );
    pub const DEFAULT_TIER_CREATION_FAILED: Self = Self::new(
        "default_tier_creation_failed",
        "The tierlist's default tiers could not be created",
        StatusCode::BAD_REQUEST,
    );
    // 5xx Server Errors
    pub const INTERNAL_SERVER_ERROR: Self = Self::new(
        "internal_server_error",
        "An internal server error occurred. Please try again later",
        StatusCode::INTERNAL_SERVER_ERROR,
    );
    pub const MISSING_PATH_PARAM: Self = Self::new(
        "missing_path_param",
        "Invalid request: missing required parameters",
        StatusCode::BAD_REQUEST,
    );
    pub const NOT_FOUND: Self = Self::new(
        "not_found",
        "The requested resource was not found",
        StatusCode::NOT_FOUND,
    );
    pub const PAYLOAD_TOO_LARGE: Self = Self::new(
        "payload_too_large",
        "The uploaded file exceeds the maximum allowed size",
        StatusCode::PAYLOAD_TOO_LARGE,
    );

    /// Creates a new error response.
    #[inline]
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            resource: None,
            context: None,
            status,
        }
    }

    /// Replaces the user-facing message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the resource the error relates to.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Sets the debugging context.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl IntoResponse for ErrorResponse<'_> {
    #[inline]
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_carry_error_status_codes() {
        assert_eq!(ErrorResponse::BAD_REQUEST.status, StatusCode::BAD_REQUEST);
        assert_eq!(ErrorResponse::NOT_FOUND.status, StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorResponse::PAYLOAD_TOO_LARGE.status,
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorResponse::DEFAULT_TIER_CREATION_FAILED.status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn status_is_not_serialized() {
        let response = ErrorResponse::NOT_FOUND.with_resource("tierlist");
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["name"], "not_found");
        assert_eq!(json["resource"], "tierlist");
        assert!(json.get("status").is_none());
        assert!(json.get("context").is_none());
    }

    #[test]
    fn builder_methods_override_fields() {
        let response = ErrorResponse::BAD_REQUEST
            .with_message("Invalid tierlist name")
            .with_context("name must not be empty");

        assert_eq!(response.message, "Invalid tierlist name");
        assert_eq!(response.context.as_deref(), Some("name must not be empty"));
    }
}
