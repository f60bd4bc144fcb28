use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistrarError>;

/// Failure taxonomy returned by every service operation.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("record not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("student number is already assigned")]
    DuplicateStudentNumber,
    #[error("student is already enrolled in this course")]
    DuplicateEnrollment,
    #[error("account is already linked to another person")]
    DuplicateAccountLink,
    #[error("referenced record does not exist: {0}")]
    ForeignKeyViolation(String),
    #[error("not permitted: {0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl RegistrarError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Maps constraint violations raised by the store to their typed
    /// counterparts. Uniqueness is enforced by the schema, so a writer that
    /// loses a race still gets the same error the pre-check would have
    /// produced instead of corrupting the invariant.
    pub fn from_write_err(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                if msg.contains("username") {
                    Self::DuplicateUsername
                } else if msg.contains("email") {
                    Self::DuplicateEmail
                } else if msg.contains("student_number") {
                    Self::DuplicateStudentNumber
                } else if msg.contains("user_id") {
                    Self::DuplicateAccountLink
                } else if msg.contains("student_id")
                    || msg.contains("course_id")
                    || msg.contains("student-course")
                {
                    Self::DuplicateEnrollment
                } else {
                    Self::Db(err)
                }
            }
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ForeignKeyViolation(msg),
            _ => Self::Db(err),
        }
    }
}
