use thiserror::Error;

/// Errors raised while verifying the identity attached to a request
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Expired token")]
    ExpiredToken,

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),
}
