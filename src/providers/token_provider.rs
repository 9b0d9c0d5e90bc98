use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::internal::context::Identity;

/// JWT Claims structure
///
/// Tokens are issued by the session service; this backend only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Subject (user_id)
    pub user_id: String,

    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Verifies HS256 access tokens and turns them into request identities
pub struct TokenProvider {
    jwt_secret: String,
}

impl TokenProvider {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Validate a JWT and return the claims
    ///
    /// # Returns
    /// * `Ok(Claims)` - Signature and expiry are valid
    /// * `Err(InternalError)` - ExpiredToken or InvalidToken credential error
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => InternalError::from(CredentialError::ExpiredToken),
            _ => InternalError::from(CredentialError::InvalidToken(e.to_string())),
        })?;

        Ok(token_data.claims)
    }

    /// Resolve a bearer token to the identity it carries
    pub fn identify(&self, token: &str) -> Result<Identity, InternalError> {
        self.validate_jwt(token).map(Identity::from)
    }

    /// Sign a token for the given identity
    ///
    /// Used by operator tooling and tests; interactive sessions are issued elsewhere.
    pub fn issue_token(&self, identity: &Identity, ttl_seconds: i64) -> Result<String, InternalError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            role: identity.role.clone(),
            exp: now + ttl_seconds,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_generation", format!("Failed to generate JWT: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-minimum-32-characters-long";

    #[test]
    fn test_issued_token_identifies_caller() {
        let provider = TokenProvider::new(SECRET);
        let identity = Identity::new("u-1", "alice").with_role("admin");

        let token = provider.issue_token(&identity, 300).unwrap();
        let resolved = provider.identify(&token).unwrap();

        assert_eq!(resolved, identity);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let issuer = TokenProvider::new("another-secret-key-minimum-32-characters");
        let verifier = TokenProvider::new(SECRET);
        let token = issuer.issue_token(&Identity::new("u-1", "alice"), 300).unwrap();

        let result = verifier.validate_jwt(&token);

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let provider = TokenProvider::new(SECRET);
        // Past the default 60 second leeway
        let token = provider.issue_token(&Identity::new("u-1", "alice"), -600).unwrap();

        let result = provider.validate_jwt(&token);

        assert!(matches!(
            result,
            Err(InternalError::Credential(CredentialError::ExpiredToken))
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let provider = TokenProvider::new(SECRET);

        assert!(provider.validate_jwt("not-a-jwt").is_err());
    }
}
