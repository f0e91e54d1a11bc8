// Core modules
mod config;
pub mod api;
pub mod auth;
pub mod db;
pub mod student;
pub mod types;

// Re-export key types and functions
pub use auth::{AuthConfig, AuthenticationGate, FailurePolicy, JwtProvider, PasswordEncoder};
pub use config::{AppConfig, DEFAULT_BIND, load_config, parse_config};
pub use db::{DatabaseConfig, Db, create_connection, ensure_schema};
pub use student::{StudentRepository, StudentService};

use std::sync::Arc;

use anyhow::Result;
use axum::Router;

/// Wire the token authority, gate and student service onto a database.
pub fn build_router(db: Db, auth: &AuthConfig) -> Router {
    let jwt_provider = Arc::new(JwtProvider::new(
        &auth.jwt_secret,
        auth.jwt_issuer.clone(),
        auth.token_ttl_seconds,
    ));
    let gate = Arc::new(AuthenticationGate::new(
        jwt_provider.clone(),
        auth.failure_policy(),
    ));
    let service = Arc::new(StudentService::new(
        StudentRepository::new(db),
        PasswordEncoder::new(auth.bcrypt_cost),
        jwt_provider,
    ));

    api::create_router(service, gate)
}

/// Convenience function to create a fully configured application.
///
/// Connects to the configured database, bootstraps the schema, and returns
/// the router ready to be served.
pub async fn create_app(config: &AppConfig) -> Result<Router> {
    config.validate()?;

    let db = create_connection(config.database.clone()).await?;
    ensure_schema(&db).await?;

    Ok(build_router(db, &config.auth))
}
