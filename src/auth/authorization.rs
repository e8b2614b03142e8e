use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::courses as course_db;
use crate::db::orders as order_db;
use crate::error::AppError;
use crate::models::{courses, orders, users};

/// Only teachers may manage the catalog.
pub fn require_teacher(user: &users::Model) -> Result<(), AppError> {
    if user.is_teacher() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only teachers can manage courses".to_string(),
        ))
    }
}

/// Load an order the acting student owns.
pub async fn verify_order_owner(
    db: &DatabaseConnection,
    order_id: Uuid,
    user_id: Uuid,
) -> Result<orders::Model, AppError> {
    let order = order_db::get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))?;

    if order.student_id != user_id {
        return Err(AppError::Forbidden(
            "This enrollment belongs to another student".to_string(),
        ));
    }

    Ok(order)
}

/// Load a course the acting teacher owns.
pub async fn verify_course_owner(
    db: &DatabaseConnection,
    course_id: Uuid,
    user: &users::Model,
) -> Result<courses::Model, AppError> {
    require_teacher(user)?;

    let course = course_db::get_course_by_id(db, course_id)
        .await?
        .ok_or_else(|| AppError::course_not_found(course_id))?;

    if !course.is_owned_by(user.id) {
        return Err(AppError::Forbidden("You do not teach this course".to_string()));
    }

    Ok(course)
}
