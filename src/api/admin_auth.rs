use std::sync::Arc;

use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result};
use poem_openapi::auth::{Bearer, BearerAuthorization};

use crate::errors::ApiError;
use crate::errors::internal::CredentialError;
use crate::errors::InternalError;
use crate::providers::TokenProvider;

/// Middleware that requires a valid bearer token
///
/// On success the caller's [`Identity`](crate::types::internal::context::Identity)
/// is inserted into the request extensions. Otherwise the request is answered
/// with a 401 envelope and never reaches the wrapped endpoint.
pub struct AdminAuth {
    tokens: Arc<TokenProvider>,
}

impl AdminAuth {
    pub fn new(tokens: Arc<TokenProvider>) -> Self {
        Self { tokens }
    }
}

impl<E: Endpoint> Middleware<E> for AdminAuth {
    type Output = AdminAuthEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        AdminAuthEndpoint {
            inner: ep,
            tokens: self.tokens.clone(),
        }
    }
}

pub struct AdminAuthEndpoint<E> {
    inner: E,
    tokens: Arc<TokenProvider>,
}

impl<E: Endpoint> Endpoint for AdminAuthEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> Result<Self::Output> {
        let identity = match Bearer::from_request(&req) {
            Ok(bearer) => self.tokens.identify(&bearer.token),
            Err(_) => Err(CredentialError::MissingToken.into()),
        };

        match identity {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                self.inner.call(req).await.map(IntoResponse::into_response)
            }
            Err(err) => {
                tracing::debug!("Rejected admin request to {}: {}", req.uri().path(), err);
                let msg = match err {
                    InternalError::Credential(CredentialError::MissingToken) => "No token provided",
                    _ => "Invalid or expired token",
                };
                Ok(ApiError::unauthorized(msg).into_response())
            }
        }
    }
}
