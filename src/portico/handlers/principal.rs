//! Bearer-token authentication for protected handlers.
//!
//! Flow Overview: read the `Authorization` header, strip the `Bearer ` prefix,
//! verify the token with the shared [`TokenIssuer`], and hand the decoded
//! claims to the handler. Handlers opt in by taking [`AuthUser`] as an
//! argument; a failed check never reaches the handler body.

use crate::portico::{
    handlers::{failure, MSG_INTERNAL_ERROR, MSG_INVALID_TOKEN, MSG_UNAUTHORIZED},
    token::{Claims, TokenIssuer},
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

const BEARER_PREFIX: &str = "Bearer ";

/// Claims of an authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

/// Extract the token following `Bearer `, or 401 `Unauthorized`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, Response> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| {
            debug!("Missing or non-bearer authorization header");
            failure(StatusCode::UNAUTHORIZED, MSG_UNAUTHORIZED)
        })
}

/// Verify a bearer token and return its claims.
///
/// # Errors
/// Returns a 401 `Unauthorized` response if the header is missing or malformed,
/// and a 401 `Invalid or Expired Token` response if verification fails.
pub fn require_auth(headers: &HeaderMap, tokens: &TokenIssuer) -> Result<Claims, Response> {
    let token = bearer_token(headers)?;

    if token.is_empty() {
        debug!("Empty bearer token");
        return Err(failure(StatusCode::UNAUTHORIZED, MSG_INVALID_TOKEN));
    }

    tokens.verify(token).map_err(|e| {
        debug!("Token rejected: {}", e);
        failure(StatusCode::UNAUTHORIZED, MSG_INVALID_TOKEN)
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(tokens) = parts.extensions.get::<Arc<TokenIssuer>>().cloned() else {
            error!("TokenIssuer extension is not installed");
            return Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_INTERNAL_ERROR,
            ));
        };

        require_auth(&parts.headers, &tokens).map(AuthUser)
    }
}
