//! Student record operations.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::auth::{JwtProvider, PasswordEncoder};
use crate::db::StudentCreate;
use crate::student::dto::{
    PatchStudentRequestDto, PostStudentRequestDto, SignInRequestDto, SignInResponseDto,
    StudentView,
};
use crate::student::error::{MSG_SIGNED_IN, StudentError};
use crate::student::repository::StudentRepository;
use crate::types::Subject;

/// Times an auto-assigned create re-allocates after losing its number.
const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Create, patch, delete, read and sign in students.
pub struct StudentService {
    repository: StudentRepository,
    password_encoder: PasswordEncoder,
    jwt_provider: Arc<JwtProvider>,
}

impl StudentService {
    pub fn new(
        repository: StudentRepository,
        password_encoder: PasswordEncoder,
        jwt_provider: Arc<JwtProvider>,
    ) -> Self {
        Self {
            repository,
            password_encoder,
            jwt_provider,
        }
    }

    pub fn repository(&self) -> &StudentRepository {
        &self.repository
    }

    /// Register a student, returning the student number it was stored under.
    pub async fn post_student(&self, dto: PostStudentRequestDto) -> Result<i64, StudentError> {
        validate_post(&dto)?;

        if let Some(n) = dto.student_number {
            if self.exists(n).await? {
                return Err(StudentError::AlreadyExists(n));
            }
        }

        let mut create = StudentCreate {
            student_number: dto.student_number.unwrap_or_default(),
            name: dto.name,
            age: dto.age,
            address: dto.address,
            graduation: dto.graduation,
            password: self.password_encoder.encode(&dto.password)?,
        };

        let student_number = match dto.student_number {
            Some(_) => {
                self.insert(&create).await?;
                create.student_number
            }
            None => self.insert_with_next_number(&mut create).await?,
        };

        info!("Created student {}", student_number);
        Ok(student_number)
    }

    /// Overwrite a student's address.
    pub async fn patch_student(
        &self,
        dto: PatchStudentRequestDto,
    ) -> Result<StudentView, StudentError> {
        if !self.exists(dto.student_number).await? {
            return Err(StudentError::NotFound(dto.student_number));
        }

        let updated = self
            .repository
            .update_address(dto.student_number, &dto.address)
            .await
            .map_err(|e| StudentError::Database(e.to_string()))?
            .ok_or(StudentError::NotFound(dto.student_number))?;

        debug!("Updated address of student {}", dto.student_number);
        Ok(updated.into())
    }

    /// Remove a student.
    pub async fn delete_student(&self, student_number: i64) -> Result<(), StudentError> {
        if !self.exists(student_number).await? {
            return Err(StudentError::NotFound(student_number));
        }

        let removed = self
            .repository
            .delete_by_id(student_number)
            .await
            .map_err(|e| StudentError::Database(e.to_string()))?;
        if !removed {
            return Err(StudentError::NotFound(student_number));
        }

        info!("Deleted student {}", student_number);
        Ok(())
    }

    /// Read a student.
    pub async fn get_student(&self, student_number: i64) -> Result<StudentView, StudentError> {
        self.repository
            .find_by_id(student_number)
            .await
            .map_err(|e| StudentError::Database(e.to_string()))?
            .map(StudentView::from)
            .ok_or(StudentError::NotFound(student_number))
    }

    /// Verify a student's password and issue a bearer token.
    pub async fn sign_in(&self, dto: SignInRequestDto) -> Result<SignInResponseDto, StudentError> {
        let student = match self
            .repository
            .find_by_student_number(dto.student_number)
            .await
        {
            Ok(Some(student)) => student,
            Ok(None) => {
                return Err(StudentError::SignInLookup(format!(
                    "no student {}",
                    dto.student_number
                )));
            }
            Err(e) => {
                error!("Sign-in lookup failed for {}: {}", dto.student_number, e);
                return Err(StudentError::SignInLookup(e.to_string()));
            }
        };

        if !self
            .password_encoder
            .matches(&dto.password, &student.password)
        {
            warn!("Password mismatch for student {}", dto.student_number);
            return Err(StudentError::CredentialMismatch);
        }

        let token = self
            .jwt_provider
            .issue(&Subject::new(student.student_number.to_string()))?;

        Ok(SignInResponseDto {
            message: MSG_SIGNED_IN.to_string(),
            token,
        })
    }

    /// Write a record, reporting a taken number as `AlreadyExists`.
    async fn insert(&self, create: &StudentCreate) -> Result<(), StudentError> {
        if let Err(e) = self.repository.save(create).await {
            // Lost a race for the same number between the check and the write.
            if self.exists(create.student_number).await? {
                return Err(StudentError::AlreadyExists(create.student_number));
            }
            return Err(StudentError::Database(e.to_string()));
        }
        Ok(())
    }

    /// Allocate the next free number and write the record under it,
    /// re-allocating when a concurrent create takes the number first.
    async fn insert_with_next_number(
        &self,
        create: &mut StudentCreate,
    ) -> Result<i64, StudentError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            create.student_number = self
                .repository
                .next_student_number()
                .await
                .map_err(|e| StudentError::Database(e.to_string()))?
                .ok_or(StudentError::NumbersExhausted)?;

            match self.insert(create).await {
                Ok(()) => return Ok(create.student_number),
                Err(StudentError::AlreadyExists(n)) => {
                    debug!("Student number {} taken concurrently (attempt {})", n, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        Err(StudentError::AlreadyExists(create.student_number))
    }

    async fn exists(&self, student_number: i64) -> Result<bool, StudentError> {
        self.repository
            .exists_by_id(student_number)
            .await
            .map_err(|e| StudentError::Database(e.to_string()))
    }
}

fn validate_post(dto: &PostStudentRequestDto) -> Result<(), StudentError> {
    if dto.name.trim().is_empty() {
        return Err(StudentError::Validation("name must not be blank".to_string()));
    }
    if dto.password.is_empty() {
        return Err(StudentError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    if dto.age < 0 {
        return Err(StudentError::Validation(
            "age must not be negative".to_string(),
        ));
    }
    if matches!(dto.student_number, Some(n) if n <= 0) {
        return Err(StudentError::Validation(
            "studentNumber must be positive".to_string(),
        ));
    }
    Ok(())
}
