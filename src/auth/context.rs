//! Request-scoped identity.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

use crate::types::{Authority, Subject};

/// Message returned when a handler demands authentication and none is bound.
pub const UNAUTHENTICATED_MESSAGE: &str = "인증이 필요합니다.";

/// Identity bound to a single request by the authentication gate.
///
/// Lives in the request's extensions and is dropped with the request; it is
/// never persisted or shared between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedContext {
    subject: Subject,
    authorities: Vec<Authority>,
}

impl AuthenticatedContext {
    /// Create a context for a verified subject with no granted authorities.
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            authorities: Vec::new(),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn authorities(&self) -> &[Authority] {
        &self.authorities
    }
}

/// Extractor for handlers that require an authenticated caller.
///
/// Rejects with 401 when the gate did not bind a context.
#[derive(Debug, Clone)]
pub struct Principal(pub AuthenticatedContext);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedContext>()
            .cloned()
            .map(Principal)
            .ok_or((StatusCode::UNAUTHORIZED, UNAUTHENTICATED_MESSAGE))
    }
}

/// Extractor for handlers that only want to know who is calling, if anyone.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<AuthenticatedContext>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybePrincipal(
            parts.extensions.get::<AuthenticatedContext>().cloned(),
        ))
    }
}
