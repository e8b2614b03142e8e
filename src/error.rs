use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

use crate::models::orders::Status;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("You are already enrolled in this course")]
    AlreadyEnrolled,

    #[error("The course is full: all seats are taken")]
    CourseFull,

    #[error("Module {0} does not belong to this course")]
    ModuleNotInCourse(Uuid),

    #[error("An order cannot move from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("A {0} enrollment cannot be cancelled")]
    CannotCancel(Status),

    #[error("Only completed or cancelled enrollments can be deleted")]
    CannotDeleteActive,

    #[error("This enrollment is {0}; its progress can no longer change")]
    OrderClosed(Status),

    #[error("Complete every module before finishing the course")]
    ModulesIncomplete,

    #[error("Progress must reach 100% before finishing the course")]
    ProgressIncomplete,

    #[error("A course with active students cannot be deleted")]
    CourseHasActiveStudents,

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Database(err)
    }
}

impl AppError {
    pub fn course_not_found(id: Uuid) -> Self {
        AppError::NotFound(format!("Course {id} not found"))
    }

    pub fn order_not_found(id: Uuid) -> Self {
        AppError::NotFound(format!("Order {id} not found"))
    }

    /// Map a failed order insert: a unique-index hit means a concurrent
    /// enrollment for the same (course, student) won.
    pub fn from_order_insert(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::AlreadyEnrolled,
            _ => AppError::Database(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                "Database error occurred".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "message": message,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preconditions_are_bad_requests() {
        for err in [
            AppError::AlreadyEnrolled,
            AppError::CourseFull,
            AppError::CannotCancel(Status::Completed),
            AppError::CannotDeleteActive,
            AppError::Validation("x".to_string()),
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn authorization_is_reported_apart_from_preconditions() {
        let err = AppError::Forbidden("not yours".to_string());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        let err = AppError::NotFound("Order not found".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn transition_message_names_both_states() {
        let err = AppError::InvalidTransition {
            from: Status::Cancelled,
            to: Status::Completed,
        };
        assert_eq!(
            err.to_string(),
            "An order cannot move from cancelled to completed"
        );
    }
}
