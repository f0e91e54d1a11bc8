//! One-way adaptive password hashing (bcrypt).

use std::fmt;

use tracing::debug;

/// Cost used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Errors from password hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The secret exceeds what bcrypt can hash without truncation
    TooLong(usize),
    /// The underlying hasher failed
    Hashing(String),
}

impl fmt::Display for PasswordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(len) => write!(
                f,
                "Password is {} bytes, at most {} are allowed",
                len, MAX_PASSWORD_BYTES
            ),
            Self::Hashing(msg) => write!(f, "Password hashing failed: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hashes and verifies student passwords.
///
/// Every `encode` call draws a fresh salt, so the same secret yields a
/// different digest each time; the salt and cost travel inside the digest.
#[derive(Debug, Clone, Copy)]
pub struct PasswordEncoder {
    cost: u32,
}

impl Default for PasswordEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordEncoder {
    /// Create an encoder; the cost is clamped to bcrypt's accepted range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext secret.
    pub fn encode(&self, secret: &str) -> Result<String, PasswordError> {
        if secret.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong(secret.len()));
        }
        bcrypt::hash(secret, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Check a candidate secret against a stored digest.
    ///
    /// A malformed digest is a mismatch, not an error.
    pub fn matches(&self, candidate: &str, hashed: &str) -> bool {
        if candidate.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(candidate, hashed) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("Rejecting malformed password hash: {}", e);
                false
            }
        }
    }
}
