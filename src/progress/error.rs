use thiserror::Error;

use crate::model::DatabaseError;

pub type ProgressResult<T> = std::result::Result<T, ProgressError>;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("enrollment not found")]
    EnrollmentNotFound,
    #[error("lesson not found in the enrolled course")]
    LessonNotInCourse,
    #[error("enrollment does not belong to the acting user")]
    NotEnrollmentOwner,
    #[error("enrollment is cancelled")]
    EnrollmentCancelled,
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for ProgressError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(DatabaseError::SqlxError(e))
    }
}
