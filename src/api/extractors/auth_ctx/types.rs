/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - the auth middleware verifies the token and stores it in request extensions
 */

/// Context attached to every authenticated request.
///
/// - `subject` is the identity provider's `sub` claim
/// - `jti` is kept for log correlation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: String,
    pub jti: Option<String>,
}
