use serde::Deserialize;
use std::{env, fs, path::PathBuf};

use crate::auth::{AuthConfig, MAX_TOKEN_TTL_SECONDS};
use crate::db::DatabaseConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

/// Service configuration, as read from `student-registry.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "JWT secret is not configured (set auth.jwt_secret or STUDENT_REGISTRY_JWT_SECRET)"
            ));
        }
        if self.auth.token_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("auth.token_ttl_seconds must be positive"));
        }
        if self.auth.token_ttl_seconds > MAX_TOKEN_TTL_SECONDS {
            return Err(anyhow::anyhow!(
                "auth.token_ttl_seconds must not exceed {}",
                MAX_TOKEN_TTL_SECONDS
            ));
        }
        Ok(())
    }
}

/// Locate the config file, if any.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("STUDENT_REGISTRY_CONFIG") {
        return Some(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg)
            .join("student-registry")
            .join("config.json");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    let candidate = PathBuf::from("student-registry.json");
    if candidate.exists() {
        return Some(candidate);
    }

    None
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}

fn expand_config(cfg: AppConfig) -> AppConfig {
    let mut cfg = cfg;

    cfg.bind = expand_env_vars(&cfg.bind);
    cfg.database.url = expand_env_vars(&cfg.database.url);
    cfg.database.namespace = expand_env_vars(&cfg.database.namespace);
    cfg.database.database = expand_env_vars(&cfg.database.database);
    if let Some(user) = cfg.database.username.as_mut() {
        *user = expand_env_vars(user);
    }
    if let Some(pass) = cfg.database.password.as_mut() {
        *pass = expand_env_vars(pass);
    }
    cfg.auth.jwt_secret = expand_env_vars(&cfg.auth.jwt_secret);
    cfg.auth.jwt_issuer = expand_env_vars(&cfg.auth.jwt_issuer);

    cfg
}

/// Parse a config document, expanding `${VAR}` references.
pub fn parse_config(raw: &str) -> anyhow::Result<AppConfig> {
    let cfg: AppConfig = serde_json::from_str(raw)?;
    Ok(expand_config(cfg))
}

/// Load the config file if one can be found, otherwise defaults.
pub fn load_config() -> anyhow::Result<AppConfig> {
    match resolve_config_path() {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Could not read {}: {}", path.display(), e))?;
            tracing::info!("Loaded configuration from {}", path.display());
            parse_config(&raw)
        }
        None => Ok(AppConfig::default()),
    }
}
