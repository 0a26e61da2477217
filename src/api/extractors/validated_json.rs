/*
 * Responsibility
 * - Parse a JSON body and run the DTO's validate() in one step
 * - The body is parsed as JSON whatever its Content-Type (browsers send text/plain for fetch bodies)
 * - Both malformed JSON and failed validation become AppError::Validation (400)
 * - Runs as the last extractor, so nothing is written before the body is known good
 */
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Format checks a request DTO performs after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), &'static str>;
}

#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(error = %rejection.body_text(), "failed to read request body");
            AppError::validation(rejection.body_text())
        })?;

        let value = serde_json::from_slice::<T>(&bytes).map_err(|err| {
            tracing::debug!(error = %err, "rejected request body");
            AppError::validation(format!("invalid JSON body: {err}"))
        })?;

        if let Err(message) = value.validate() {
            tracing::debug!(error = message, "request body failed validation");
            return Err(AppError::validation(message));
        }

        Ok(Self(value))
    }
}
