//! Errors for student record operations and their HTTP rendering.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::auth::{PasswordError, TokenError};

pub const MSG_CREATED: &str = "성공!";
pub const MSG_UPDATED: &str = "성공";
pub const MSG_DELETED: &str = "성공!";
pub const MSG_SIGNED_IN: &str = "성공";
pub const MSG_NOT_FOUND: &str = "존재하지 않는 학생 입니다.";
pub const MSG_ALREADY_EXISTS: &str = "이미 존재하는 학생 입니다.";
pub const MSG_NUMBERS_EXHAUSTED: &str = "사용 가능한 학번이 없습니다.";
pub const MSG_INVALID_REQUEST: &str = "잘못된 요청 입니다.";
pub const MSG_ERROR: &str = "오류";
pub const MSG_PASSWORD_MISMATCH: &str = "비밀번호 불일치";

/// Errors that can occur during student record operations.
#[derive(Debug, Clone)]
pub enum StudentError {
    /// No record with this student number
    NotFound(i64),
    /// A record with this student number already exists
    AlreadyExists(i64),
    /// No student number is left to assign
    NumbersExhausted,
    /// The request body is unusable
    Validation(String),
    /// Sign-in target is unknown or could not be loaded
    SignInLookup(String),
    /// Sign-in password does not match
    CredentialMismatch,
    /// Password hashing failed
    Password(PasswordError),
    /// Token issuance failed
    Token(TokenError),
    /// Database error
    Database(String),
}

impl fmt::Display for StudentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(n) => write!(f, "Student not found: {}", n),
            Self::AlreadyExists(n) => write!(f, "Student already exists: {}", n),
            Self::NumbersExhausted => write!(f, "No student numbers left to assign"),
            Self::Validation(msg) => write!(f, "Validation failed: {}", msg),
            Self::SignInLookup(msg) => write!(f, "Sign-in lookup failed: {}", msg),
            Self::CredentialMismatch => write!(f, "Password does not match"),
            Self::Password(e) => write!(f, "{}", e),
            Self::Token(e) => write!(f, "{}", e),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StudentError {}

impl From<PasswordError> for StudentError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooLong(_) => Self::Validation(err.to_string()),
            PasswordError::Hashing(_) => Self::Password(err),
        }
    }
}

impl From<TokenError> for StudentError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

impl StudentError {
    /// Status code and user-facing message.
    ///
    /// Internal details stay in the logs; callers only see the short message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound(_) => (StatusCode::BAD_REQUEST, MSG_NOT_FOUND.to_string()),
            Self::AlreadyExists(_) => (StatusCode::CONFLICT, MSG_ALREADY_EXISTS.to_string()),
            Self::NumbersExhausted => (StatusCode::CONFLICT, MSG_NUMBERS_EXHAUSTED.to_string()),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, MSG_INVALID_REQUEST.to_string()),
            Self::SignInLookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, MSG_ERROR.to_string()),
            Self::CredentialMismatch => (
                StatusCode::INTERNAL_SERVER_ERROR,
                MSG_PASSWORD_MISMATCH.to_string(),
            ),
            Self::Password(_) | Self::Token(_) | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, MSG_ERROR.to_string())
            }
        }
    }
}

impl IntoResponse for StudentError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Student request failed: {}", self);
        } else if let Self::Validation(_) = self {
            warn!("Rejected student request: {}", self);
        }
        (status, message).into_response()
    }
}
