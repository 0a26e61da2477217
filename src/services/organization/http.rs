//! Organization lookup over HTTP against the internal organization endpoint.
//!
//! The caller's headers are forwarded so the endpoint can identify the session,
//! but `Authorization` is replaced by the shared internal secret.
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use url::Url;

use super::resolver::{Organization, OrganizationError, OrganizationResolver};

/// Carries the verified token subject to the organization endpoint.
pub const SUBJECT_HEADER: HeaderName = HeaderName::from_static("x-auth-subject");

// Hop-by-hop / body headers that must not be replayed on a bodyless GET.
const DROPPED_HEADERS: [HeaderName; 6] = [
    header::CONTENT_LENGTH,
    header::CONTENT_TYPE,
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::ACCEPT_ENCODING,
];

#[derive(Clone)]
pub struct HttpOrganizationResolver {
    client: reqwest::Client,
    url: Url,
    internal_secret: String,
}

impl std::fmt::Debug for HttpOrganizationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the internal secret
        f.debug_struct("HttpOrganizationResolver")
            .field("url", &self.url.as_str())
            .finish()
    }
}

impl HttpOrganizationResolver {
    pub fn new(
        url: Url,
        internal_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OrganizationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url,
            internal_secret: internal_secret.into(),
        })
    }

    fn forwarded_headers(
        &self,
        inbound: &HeaderMap,
        subject: &str,
    ) -> Result<HeaderMap, OrganizationError> {
        let mut headers = inbound.clone();
        for name in DROPPED_HEADERS {
            headers.remove(name);
        }

        let authorization = HeaderValue::from_str(&format!("BEARER {}", self.internal_secret))
            .map_err(|_| OrganizationError::InvalidHeader("authorization"))?;
        headers.insert(header::AUTHORIZATION, authorization);

        let subject = HeaderValue::from_str(subject)
            .map_err(|_| OrganizationError::InvalidHeader("x-auth-subject"))?;
        headers.insert(SUBJECT_HEADER, subject);

        Ok(headers)
    }
}

#[async_trait]
impl OrganizationResolver for HttpOrganizationResolver {
    async fn resolve(
        &self,
        headers: &HeaderMap,
        subject: &str,
    ) -> Result<Organization, OrganizationError> {
        let headers = self.forwarded_headers(headers, subject)?;

        let res = self
            .client
            .get(self.url.clone())
            .headers(headers)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(OrganizationError::Status(status.as_u16()));
        }

        let organization = res.json::<Organization>().await?;
        if organization.id.trim().is_empty() {
            return Err(OrganizationError::MissingId);
        }

        tracing::debug!(organization_id = %organization.id, "resolved organization");

        Ok(organization)
    }
}
