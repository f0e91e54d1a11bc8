use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

/// Table holding student records.
pub const STUDENT_TABLE: &str = "student";

/// A stored student record.
///
/// The record id is `student:<student_number>`, so the student number
/// uniquely determines at most one live record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Database identifier
    pub id: RecordId,
    /// Student number (immutable once created)
    pub student_number: i64,
    pub name: String,
    pub age: i64,
    pub address: String,
    pub graduation: bool,
    /// bcrypt digest of the student's password
    pub password: String,
    pub created_at: Option<Datetime>,
    pub updated_at: Option<Datetime>,
}

/// Payload for creating a new student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCreate {
    pub student_number: i64,
    pub name: String,
    pub age: i64,
    pub address: String,
    pub graduation: bool,
    /// Already-hashed password
    pub password: String,
}

/// Projection used to find the highest allocated student number.
#[derive(Debug, Deserialize)]
pub(crate) struct StudentNumberRow {
    pub student_number: i64,
}
