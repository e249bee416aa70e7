//! A JSON request body extractor that reports bad bodies as an [Error].

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// Extracts and deserializes a JSON request body, like [axum::Json].
///
/// A missing content type, malformed JSON or a body that does not match `T`
/// is rejected with [Error::InvalidRequest], so the client gets the same
/// `{"error": ...}` response as any other error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;

        Ok(Self(value))
    }
}
