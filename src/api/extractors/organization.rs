/*
 * Responsibility
 * - Resolve the caller's organization (tenant) before the handler runs
 * - Needs AuthCtx, so only usable behind the auth gate
 * - Any lookup failure becomes a generic 500 (details are logged)
 */
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::organization::Organization;
use crate::state::AppState;

use super::AuthCtxExtractor;

#[derive(Debug, Clone)]
pub struct CurrentOrganization(pub Organization);

impl FromRequestParts<AppState> for CurrentOrganization {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthCtxExtractor(auth) = AuthCtxExtractor::from_request_parts(parts, state).await?;

        let organization = state
            .organizations
            .resolve(&parts.headers, &auth.subject)
            .await?;

        tracing::debug!(
            subject = %auth.subject,
            jti = ?auth.jti,
            organization_id = %organization.id,
            "resolved organization"
        );

        Ok(Self(organization))
    }
}
