//! Request and response bodies for the student endpoints.

use serde::{Deserialize, Serialize};

use crate::auth::IssuedToken;
use crate::db::StudentRecord;

/// Body of `POST /student`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostStudentRequestDto {
    /// Requested student number; the next free one is used when omitted
    #[serde(default)]
    pub student_number: Option<i64>,
    pub name: String,
    pub password: String,
    pub age: i64,
    pub address: String,
    pub graduation: bool,
}

/// Body of `PATCH /student`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchStudentRequestDto {
    pub student_number: i64,
    pub address: String,
}

/// Body of `POST /student/sign-in`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequestDto {
    pub student_number: i64,
    pub password: String,
}

/// Successful sign-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponseDto {
    pub message: String,
    #[serde(flatten)]
    pub token: IssuedToken,
}

/// Public view of a student record; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub student_number: i64,
    pub name: String,
    pub age: i64,
    pub address: String,
    pub graduation: bool,
}

impl From<StudentRecord> for StudentView {
    fn from(record: StudentRecord) -> Self {
        Self {
            student_number: record.student_number,
            name: record.name,
            age: record.age,
            address: record.address,
            graduation: record.graduation,
        }
    }
}
