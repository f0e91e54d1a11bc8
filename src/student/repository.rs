//! Student record storage.

use anyhow::Result;

use crate::db::Db;
use crate::db::schema::{StudentCreate, StudentNumberRow, StudentRecord};

/// Record store for students, keyed by `student:<student_number>`.
///
/// Creation is atomic on the record id: SurrealDB refuses to `CREATE` a
/// record that already exists, so two concurrent creates for the same
/// number cannot both succeed.
#[derive(Clone)]
pub struct StudentRepository {
    db: Db,
}

impl StudentRepository {
    /// Create a new student repository.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get reference to the database.
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Persist a new student record.
    pub async fn save(&self, create: &StudentCreate) -> Result<StudentRecord> {
        let query = r#"
            CREATE type::thing('student', $student_number) CONTENT {
                student_number: $student_number,
                name: $name,
                age: $age,
                address: $address,
                graduation: $graduation,
                password: $password
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("student_number", create.student_number))
            .bind(("name", create.name.clone()))
            .bind(("age", create.age))
            .bind(("address", create.address.clone()))
            .bind(("graduation", create.graduation))
            .bind(("password", create.password.clone()))
            .await?;

        let students: Vec<StudentRecord> = res.take(0)?;
        students
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create student {}", create.student_number))
    }

    /// Check whether a record exists for this student number.
    pub async fn exists_by_id(&self, student_number: i64) -> Result<bool> {
        Ok(self.find_by_id(student_number).await?.is_some())
    }

    /// Load a record by its id.
    pub async fn find_by_id(&self, student_number: i64) -> Result<Option<StudentRecord>> {
        let query = "SELECT * FROM type::thing('student', $student_number)";

        let mut res = self
            .db
            .query(query)
            .bind(("student_number", student_number))
            .await?;

        let students: Vec<StudentRecord> = res.take(0)?;
        Ok(students.into_iter().next())
    }

    /// Load a record through the unique student number index.
    pub async fn find_by_student_number(
        &self,
        student_number: i64,
    ) -> Result<Option<StudentRecord>> {
        let query = r#"
            SELECT * FROM student
            WHERE student_number = $student_number
            LIMIT 1
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("student_number", student_number))
            .await?;

        let students: Vec<StudentRecord> = res.take(0)?;
        Ok(students.into_iter().next())
    }

    /// Overwrite the address of an existing record.
    ///
    /// Returns `None` if there is no such record; nothing is created.
    pub async fn update_address(
        &self,
        student_number: i64,
        address: &str,
    ) -> Result<Option<StudentRecord>> {
        let query = r#"
            UPDATE type::thing('student', $student_number)
            SET address = $address
            RETURN AFTER
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("student_number", student_number))
            .bind(("address", address.to_string()))
            .await?;

        let students: Vec<StudentRecord> = res.take(0)?;
        Ok(students.into_iter().next())
    }

    /// Delete a record. Returns whether one was removed.
    pub async fn delete_by_id(&self, student_number: i64) -> Result<bool> {
        let query = "DELETE type::thing('student', $student_number) RETURN BEFORE";

        let mut res = self
            .db
            .query(query)
            .bind(("student_number", student_number))
            .await?;

        let removed: Vec<StudentRecord> = res.take(0)?;
        Ok(!removed.is_empty())
    }

    /// Next unallocated student number, starting at 1.
    ///
    /// `None` once the highest stored number is `i64::MAX`.
    pub async fn next_student_number(&self) -> Result<Option<i64>> {
        let query = r#"
            SELECT student_number FROM student
            ORDER BY student_number DESC
            LIMIT 1
        "#;

        let mut res = self.db.query(query).await?;
        let rows: Vec<StudentNumberRow> = res.take(0)?;
        Ok(match rows.first() {
            Some(row) => row.student_number.checked_add(1),
            None => Some(1),
        })
    }
}
