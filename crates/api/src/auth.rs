//! Minimal caller-identity extraction.
//!
//! Real authentication (sessions, tokens, SSO) is explicitly out of scope;
//! this crate only needs some way to know which user is making a request
//! so the `NotAuthorized` ownership checks in `db`/`engine` have something
//! to check against. Callers identify themselves via the `X-User-Id` header.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

/// The caller's identity, extracted from the `X-User-Id` header.
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get("x-user-id").ok_or(StatusCode::UNAUTHORIZED)?;
        let value = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
        let id = Uuid::parse_str(value).map_err(|_| StatusCode::UNAUTHORIZED)?;
        Ok(UserId(id))
    }
}
