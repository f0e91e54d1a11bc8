//! Student records: storage, operations, and request/response bodies.

pub mod dto;
mod error;
mod repository;
mod service;

pub use error::{
    MSG_ALREADY_EXISTS, MSG_CREATED, MSG_DELETED, MSG_ERROR, MSG_INVALID_REQUEST, MSG_NOT_FOUND,
    MSG_NUMBERS_EXHAUSTED, MSG_PASSWORD_MISMATCH, MSG_SIGNED_IN, MSG_UPDATED, StudentError,
};
pub use repository::StudentRepository;
pub use service::StudentService;
