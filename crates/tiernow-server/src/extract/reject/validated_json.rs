//! JSON extractor with automatic validation.

use axum::extract::{FromRequest, Request};
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::extract::Json;
use crate::handler::{Error, ErrorKind};

/// JSON extractor that validates the deserialized value.
///
/// Runs the type's [`Validate`] implementation after deserialization and
/// rejects with a structured 400 response listing the failed constraints.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct ValidateJson<T>(pub T);

impl<T> ValidateJson<T> {
    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate().map_err(|err| {
            ErrorKind::BadRequest
                .with_message("Request validation failed")
                .with_context(err.to_string())
                .into_static()
        })?;

        Ok(Self(value))
    }
}
