//! Organization lookup interface used by the item handlers.
use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::Deserialize;
use thiserror::Error;

/// The caller's tenant as reported by the organization endpoint.
///
/// Only `id` is used; other fields in the reply are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub id: String,
}

/// Lookup errors (transport/status/payload).
///
/// Kept independent from `AppError`; handlers convert them into a generic 500.
#[derive(Debug, Error)]
pub enum OrganizationError {
    #[error("organization request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("organization endpoint returned status {0}")]
    Status(u16),
    #[error("organization response has no id")]
    MissingId,
    #[error("cannot forward header: {0}")]
    InvalidHeader(&'static str),
}

#[async_trait]
pub trait OrganizationResolver: Send + Sync {
    // Resolve the organization of the authenticated caller.
    //
    // `headers` are the caller's request headers; `subject` is the verified token subject.
    async fn resolve(
        &self,
        headers: &HeaderMap,
        subject: &str,
    ) -> Result<Organization, OrganizationError>;
}
