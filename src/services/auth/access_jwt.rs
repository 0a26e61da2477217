use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    InvalidKey(jsonwebtoken::errors::Error),
    Jwt(jsonwebtoken::errors::Error),
    MissingOrInvalidAud,
    EmptyClaim(&'static str),
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(e) => write!(f, "invalid rsa public key pem: {}", e),
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::MissingOrInvalidAud => write!(f, "missing or invalid 'aud' claim"),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::InvalidKey(e) | Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        serde_json::Value::String(s) => !s.trim().is_empty(),
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token claims issued by the identity provider.
///
/// NOTE:
/// - `aud` can be either string or array; jsonwebtoken validates it via `Validation::set_audience`.
/// - `sub` is an opaque provider subject (e.g. `auth0|abc123`), not a local id.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub jti: Option<String>,

    #[serde(default)]
    pub scope: Option<String>,
}

/// Verified token in the shape the rest of the app uses.
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub subject: String,
    pub jti: Option<String>,
    pub scopes: Vec<String>,
}

/// RS256 access-token verifier for the identity provider's tokens.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, AccessJwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(AccessJwtError::InvalidKey)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Verify and decode a JWT access token.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `exp`, `iss` and `aud`.
    /// This additionally requires `iss`, `aud` and `sub` to be non-empty.
    pub fn verify_strict(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let claims = self.verify(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AccessJwtError::MissingOrInvalidAud);
        }

        Ok(claims)
    }

    /// Entry point for the auth middleware.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify_strict(token)?;

        let scopes = claims
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Ok(VerifiedAccessToken {
            subject: claims.sub,
            jti: claims.jti,
            scopes,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{self, TEST_AUDIENCE, TEST_ISSUER};

    fn service() -> AuthService {
        AuthService::new(testing::PUBLIC_KEY_PEM, TEST_ISSUER, TEST_AUDIENCE, 0).unwrap()
    }

    #[test]
    fn accepts_a_valid_token() {
        let token = testing::sign_claims(json!({
            "iss": TEST_ISSUER,
            "aud": [TEST_AUDIENCE, "https://other.example"],
            "sub": "auth0|user-1",
            "exp": testing::now() + 300,
            "scope": "read:items write:items",
            "jti": "abc",
        }));

        let verified = service().verify_verified(&token).unwrap();

        assert_eq!(verified.subject, "auth0|user-1");
        assert_eq!(verified.scopes, vec!["read:items", "write:items"]);
        assert_eq!(verified.jti.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_expired_token() {
        let token = testing::sign_claims(json!({
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
            "sub": "auth0|user-1",
            "exp": testing::now() - 120,
        }));

        assert!(matches!(
            service().verify_verified(&token),
            Err(AccessJwtError::Jwt(_))
        ));
    }

    #[test]
    fn rejects_wrong_audience_and_issuer() {
        let wrong_aud = testing::sign_claims(json!({
            "iss": TEST_ISSUER,
            "aud": "someone-else",
            "sub": "auth0|user-1",
            "exp": testing::now() + 300,
        }));
        let wrong_iss = testing::sign_claims(json!({
            "iss": "https://evil.example/",
            "aud": TEST_AUDIENCE,
            "sub": "auth0|user-1",
            "exp": testing::now() + 300,
        }));

        assert!(service().verify_verified(&wrong_aud).is_err());
        assert!(service().verify_verified(&wrong_iss).is_err());
    }

    #[test]
    fn rejects_blank_subject() {
        let token = testing::sign_claims(json!({
            "iss": TEST_ISSUER,
            "aud": TEST_AUDIENCE,
            "sub": "  ",
            "exp": testing::now() + 300,
        }));

        assert!(matches!(
            service().verify_verified(&token),
            Err(AccessJwtError::EmptyClaim("sub"))
        ));
    }

    #[test]
    fn rejects_garbage_and_bad_keys() {
        assert!(service().verify_verified("not-a-jwt").is_err());
        assert!(matches!(
            AuthService::new("nope", TEST_ISSUER, TEST_AUDIENCE, 0),
            Err(AccessJwtError::InvalidKey(_))
        ));
    }
}
