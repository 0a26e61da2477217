/*
 * Responsibility
 * - Request extractors shared by handlers
 */
pub mod auth_ctx;
pub mod organization;
pub mod validated_json;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use organization::CurrentOrganization;
pub use validated_json::{Validate, ValidatedJson};
