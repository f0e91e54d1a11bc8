//! Per-request authentication gate.
//!
//! The gate reads `Authorization: Bearer <token>`, asks a [`TokenValidator`]
//! for the subject, and binds an [`AuthenticatedContext`] to the request on
//! success. It never rejects a request for a missing or bad credential;
//! handlers that need an identity demand it through the
//! [`Principal`](crate::auth::Principal) extractor.
//!
//! Faults inside the gate itself (unreadable header bytes, a broken token
//! authority) are governed by [`FailurePolicy`].

use std::fmt;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::auth::context::{AuthenticatedContext, UNAUTHENTICATED_MESSAGE};
use crate::auth::password::DEFAULT_BCRYPT_COST;
use crate::auth::token::{DEFAULT_ISSUER, DEFAULT_TOKEN_TTL_SECONDS, TokenError, TokenValidator};
use crate::types::Subject;

/// Exact, case-sensitive scheme prefix.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing and verifying tokens
    #[serde(default)]
    pub jwt_secret: String,
    /// `iss` claim issued and required
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Lifetime of issued tokens
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
    /// Whether internal gate faults let the request through unauthenticated
    #[serde(default = "default_fail_open")]
    pub fail_open: bool,
    /// bcrypt cost for new password hashes
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

fn default_token_ttl_seconds() -> u64 {
    DEFAULT_TOKEN_TTL_SECONDS
}

fn default_fail_open() -> bool {
    true
}

fn default_bcrypt_cost() -> u32 {
    DEFAULT_BCRYPT_COST
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            fail_open: true,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl AuthConfig {
    /// Create a config signing with the given secret and default settings.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        if self.fail_open {
            FailurePolicy::Open
        } else {
            FailurePolicy::Closed
        }
    }
}

/// What the gate does when it faults internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and continue as unauthenticated
    Open,
    /// Log and reject with 401
    Closed,
}

/// Faults raised while inspecting a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFault {
    /// The Authorization header is not valid visible ASCII / UTF-8
    UnreadableHeader(String),
    /// The token authority failed for reasons unrelated to the token
    Authority(String),
}

impl fmt::Display for GateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableHeader(msg) => write!(f, "Unreadable Authorization header: {}", msg),
            Self::Authority(msg) => write!(f, "Token authority fault: {}", msg),
        }
    }
}

impl std::error::Error for GateFault {}

/// Per-request authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unauthenticated,
    Authenticated,
}

/// The request capabilities the gate needs.
pub trait CredentialCarrier {
    /// Raw `Authorization` header value, if present.
    fn authorization(&self) -> Result<Option<&str>, GateFault>;

    /// Context already bound to this request, if any.
    fn principal(&self) -> Option<&AuthenticatedContext>;

    /// Bind a context to this request.
    fn bind_principal(&mut self, context: AuthenticatedContext);
}

impl<B> CredentialCarrier for http::Request<B> {
    fn authorization(&self) -> Result<Option<&str>, GateFault> {
        self.headers()
            .get(AUTHORIZATION)
            .map(|value| {
                value
                    .to_str()
                    .map_err(|e| GateFault::UnreadableHeader(e.to_string()))
            })
            .transpose()
    }

    fn principal(&self) -> Option<&AuthenticatedContext> {
        self.extensions().get::<AuthenticatedContext>()
    }

    fn bind_principal(&mut self, context: AuthenticatedContext) {
        self.extensions_mut().insert(context);
    }
}

/// Extract the token from an Authorization header value.
///
/// Returns `None` for blank values and anything not starting with exactly
/// `"Bearer "`.
pub fn parse_bearer_token(authorization: Option<&str>) -> Option<&str> {
    let authorization = authorization?;
    if authorization.trim().is_empty() {
        return None;
    }
    authorization.strip_prefix(BEARER_PREFIX)
}

/// Authentication gate shared by all requests.
#[derive(Clone)]
pub struct AuthenticationGate {
    validator: Arc<dyn TokenValidator>,
    policy: FailurePolicy,
}

impl fmt::Debug for AuthenticationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AuthenticationGate {
    pub fn new(validator: Arc<dyn TokenValidator>, policy: FailurePolicy) -> Self {
        Self { validator, policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Work out who is calling without touching the request.
    ///
    /// `Ok(None)` covers every ordinary failure: no header, wrong scheme,
    /// rejected token.
    pub fn inspect<R: CredentialCarrier>(&self, request: &R) -> Result<Option<Subject>, GateFault> {
        let Some(token) = parse_bearer_token(request.authorization()?) else {
            return Ok(None);
        };

        match self.validator.validate(token) {
            Ok(subject) => Ok(Some(subject)),
            Err(TokenError::Invalid(reason)) => {
                debug!("Ignoring bearer token: {}", reason);
                Ok(None)
            }
            Err(TokenError::Internal(reason)) => Err(GateFault::Authority(reason)),
        }
    }

    /// Run the gate on a request, binding the caller's identity on success.
    ///
    /// An `Err` is only returned under [`FailurePolicy::Closed`]; the open
    /// policy logs the fault and reports `Unauthenticated`.
    pub fn apply<R: CredentialCarrier>(&self, request: &mut R) -> Result<GateState, GateFault> {
        if request.principal().is_some() {
            return Ok(GateState::Authenticated);
        }

        match self.inspect(&*request) {
            Ok(Some(subject)) => {
                debug!("Authenticated request for subject: {}", subject);
                request.bind_principal(AuthenticatedContext::new(subject));
                Ok(GateState::Authenticated)
            }
            Ok(None) => Ok(GateState::Unauthenticated),
            Err(fault) => {
                warn!("Authentication gate fault: {}", fault);
                match self.policy {
                    FailurePolicy::Open => Ok(GateState::Unauthenticated),
                    FailurePolicy::Closed => Err(fault),
                }
            }
        }
    }
}

/// axum middleware running the gate ahead of every handler.
pub async fn authentication_layer(
    State(gate): State<Arc<AuthenticationGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.apply(&mut request) {
        Ok(_) => next.run(request).await,
        Err(_) => (StatusCode::UNAUTHORIZED, UNAUTHENTICATED_MESSAGE).into_response(),
    }
}
