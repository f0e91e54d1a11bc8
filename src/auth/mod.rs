//! Authentication module.
//!
//! - **Credential verification**: bcrypt password hashing ([`PasswordEncoder`])
//! - **Token authority**: HS256 JWT issuance/validation ([`JwtProvider`])
//! - **Authentication gate**: axum middleware binding an
//!   [`AuthenticatedContext`] to each request carrying a valid bearer token
//!
//! ## Security Model
//!
//! - Identity is established per request and travels in request extensions;
//!   there is no process-wide security context
//! - The gate only ever adds identity; it does not reject requests for
//!   missing or invalid credentials
//! - Handlers that need a caller use the [`Principal`] extractor, which
//!   answers 401 when no identity is bound
//!
//! ## Usage
//!
//! ```ignore
//! let provider = Arc::new(JwtProvider::new(&secret, DEFAULT_ISSUER, 3600));
//! let gate = Arc::new(AuthenticationGate::new(provider, FailurePolicy::Open));
//!
//! let app = Router::new()
//!     .route("/me", get(|Principal(ctx): Principal| async move { ctx.subject().to_string() }))
//!     .layer(axum::middleware::from_fn_with_state(gate, authentication_layer));
//! ```

mod context;
mod gate;
mod password;
mod token;

pub use context::{AuthenticatedContext, MaybePrincipal, Principal, UNAUTHENTICATED_MESSAGE};
pub use gate::{
    AuthConfig, AuthenticationGate, BEARER_PREFIX, CredentialCarrier, FailurePolicy, GateFault,
    GateState, authentication_layer, parse_bearer_token,
};
pub use password::{DEFAULT_BCRYPT_COST, MAX_PASSWORD_BYTES, PasswordEncoder, PasswordError};
pub use token::{
    DEFAULT_ISSUER, DEFAULT_TOKEN_TTL_SECONDS, IssuedToken, JwtClaims, JwtProvider,
    MAX_TOKEN_TTL_SECONDS, TokenError, TokenValidator,
};
