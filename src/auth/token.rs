//! Bearer token issuance and validation (HS256 JWT).

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::Subject;

/// Default token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

/// Longest accepted token lifetime (366 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 31_622_400;

/// Default `iss` claim.
pub const DEFAULT_ISSUER: &str = "student-registry";

/// Token errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token failed to parse, verify, or is expired / from a foreign issuer
    Invalid(String),
    /// The authority itself is broken (bad key material, signing failure)
    Internal(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "Invalid token: {}", msg),
            Self::Internal(msg) => write!(f, "Token authority failure: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Validates opaque bearer tokens.
///
/// Implementations must treat malformed input as `TokenError::Invalid`
/// rather than panicking.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> Result<Subject, TokenError>;
}

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (student number)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

/// A freshly signed token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Symmetric JWT signer/verifier.
#[derive(Clone)]
pub struct JwtProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_seconds: u64,
}

impl fmt::Debug for JwtProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtProvider")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtProvider {
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            ttl_seconds,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token for the given subject.
    pub fn issue(&self, subject: &Subject) -> Result<IssuedToken, TokenError> {
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                TokenError::Internal(format!(
                    "Token lifetime {}s is out of range",
                    self.ttl_seconds
                ))
            })?;
        let claims = JwtClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
            iss: self.issuer.clone(),
        };
        self.sign(&claims).map(|access_token| IssuedToken {
            access_token,
            expires_in: self.ttl_seconds,
        })
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Internal(format!("Failed to sign JWT: {}", e)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation
    }
}

impl TokenValidator for JwtProvider {
    fn validate(&self, token: &str) -> Result<Subject, TokenError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation()).map_err(|e| {
                match e.kind() {
                    ErrorKind::InvalidKeyFormat => TokenError::Internal(e.to_string()),
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::Invalid("Empty subject claim".to_string()));
        }

        debug!("JWT verified successfully for subject: {}", claims.sub);
        Ok(Subject::new(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> JwtProvider {
        JwtProvider::new("test-secret", DEFAULT_ISSUER, DEFAULT_TOKEN_TTL_SECONDS)
    }

    #[test]
    fn test_issue_then_validate() {
        let provider = provider();
        let issued = provider.issue(&Subject::new("1")).unwrap();

        assert_eq!(issued.expires_in, DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(
            provider.validate(&issued.access_token).unwrap(),
            Subject::new("1")
        );
    }

    #[test]
    fn test_oversized_lifetime_is_internal() {
        for ttl in [u64::MAX, i64::MAX as u64] {
            let provider = JwtProvider::new("test-secret", DEFAULT_ISSUER, ttl);
            assert!(
                matches!(
                    provider.issue(&Subject::new("1")),
                    Err(TokenError::Internal(_))
                ),
                "ttl {}",
                ttl
            );
        }
    }

    #[test]
    fn test_max_lifetime_issues() {
        let provider = JwtProvider::new("test-secret", DEFAULT_ISSUER, MAX_TOKEN_TTL_SECONDS);
        let issued = provider.issue(&Subject::new("1")).unwrap();
        assert_eq!(issued.expires_in, MAX_TOKEN_TTL_SECONDS);
        assert!(provider.validate(&issued.access_token).is_ok());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let provider = provider();
        for token in ["", " ", "abc", "a.b.c", "Bearer x"] {
            assert!(
                matches!(provider.validate(token), Err(TokenError::Invalid(_))),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issued = JwtProvider::new("other-secret", DEFAULT_ISSUER, 60)
            .issue(&Subject::new("1"))
            .unwrap();
        assert!(matches!(
            provider().validate(&issued.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_is_invalid() {
        let issued = JwtProvider::new("test-secret", "someone-else", 60)
            .issue(&Subject::new("1"))
            .unwrap();
        assert!(matches!(
            provider().validate(&issued.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_is_invalid() {
        let provider = provider();
        let now = chrono::Utc::now().timestamp();
        let token = provider
            .sign(&JwtClaims {
                sub: "1".to_string(),
                iat: now - 7200,
                exp: now - 3600,
                iss: DEFAULT_ISSUER.to_string(),
            })
            .unwrap();
        assert!(matches!(
            provider.validate(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_empty_subject_is_invalid() {
        let provider = provider();
        let now = chrono::Utc::now().timestamp();
        let token = provider
            .sign(&JwtClaims {
                sub: String::new(),
                iat: now,
                exp: now + 60,
                iss: DEFAULT_ISSUER.to_string(),
            })
            .unwrap();
        assert!(matches!(
            provider.validate(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains(DEFAULT_ISSUER));
    }

    #[test]
    fn test_token_error_display() {
        assert_eq!(
            TokenError::Invalid("bad".to_string()).to_string(),
            "Invalid token: bad"
        );
        assert_eq!(
            TokenError::Internal("key".to_string()).to_string(),
            "Token authority failure: key"
        );
    }
}
