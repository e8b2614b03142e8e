use sea_orm::*;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::modules::{self, AddModules};
use crate::models::order_modules;

/// Modules of a course in their defined sequence.
pub async fn get_modules_by_course<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
) -> Result<Vec<modules::Model>, DbErr> {
    modules::Entity::find()
        .filter(modules::Column::CourseId.eq(course_id))
        .order_by_asc(modules::Column::Position)
        .order_by_asc(modules::Column::CreatedAt)
        .order_by_asc(modules::Column::Id)
        .all(conn)
        .await
}

/// IDs of a course's modules, in sequence.
pub async fn get_module_ids<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    Ok(get_modules_by_course(conn, course_id)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect())
}

/// Fetch a module only if it belongs to the given course.
pub async fn get_module_in_course<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
    module_id: Uuid,
) -> Result<Option<modules::Model>, DbErr> {
    modules::Entity::find_by_id(module_id)
        .filter(modules::Column::CourseId.eq(course_id))
        .one(conn)
        .await
}

/// Append modules to a course.
pub async fn insert_modules(
    db: &DatabaseConnection,
    course_id: Uuid,
    input: AddModules,
) -> Result<Vec<modules::Model>, AppError> {
    input.validate().map_err(AppError::Validation)?;

    let txn = db.begin().await?;
    let mut created = Vec::with_capacity(input.modules.len());

    for module in input.modules {
        let new_module = modules::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            title: Set(module.title.trim().to_string()),
            description: Set(module.description),
            position: Set(module.position),
            duration_hours: Set(module.duration_hours.unwrap_or(2)),
            created_at: Set(chrono::Utc::now()),
        };
        created.push(new_module.insert(&txn).await?);
    }

    txn.commit().await?;
    Ok(created)
}

/// Delete a module and drop it from every order's completed set.
pub async fn delete_module(
    db: &DatabaseConnection,
    course_id: Uuid,
    module_id: Uuid,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    if get_module_in_course(&txn, course_id, module_id)
        .await?
        .is_none()
    {
        return Err(AppError::ModuleNotInCourse(module_id));
    }

    order_modules::Entity::delete_many()
        .filter(order_modules::Column::ModuleId.eq(module_id))
        .exec(&txn)
        .await?;
    modules::Entity::delete_by_id(module_id).exec(&txn).await?;

    txn.commit().await?;
    Ok(())
}
