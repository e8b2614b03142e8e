use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::courses::{self, CourseListQuery, CreateCourse, UpdateCourse};
use crate::models::orders::{self, Status};
use crate::models::{modules, order_modules};

/// Result of a seat-counter adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyChange {
    /// Delta was zero; nothing written.
    Unchanged,
    Applied,
    /// Increment refused: the course has no free seat.
    Full,
    /// Decrement refused: the counter is already at zero.
    Clamped,
}

/// The only writer of `courses.occupied_seats` apart from
/// [`reconcile_occupancy`].
///
/// Moves the counter by one seat in the direction of `delta` with a single
/// conditional `UPDATE`, so concurrent callers can neither oversubscribe the
/// course nor push the counter below zero.
pub async fn adjust_occupancy<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
    delta: i32,
) -> Result<OccupancyChange, DbErr> {
    let step = delta.signum();
    if step == 0 {
        return Ok(OccupancyChange::Unchanged);
    }

    let update = courses::Entity::update_many()
        .col_expr(
            courses::Column::OccupiedSeats,
            Expr::col(courses::Column::OccupiedSeats).add(step),
        )
        .filter(courses::Column::Id.eq(course_id));

    let update = if step > 0 {
        update.filter(
            Expr::col(courses::Column::OccupiedSeats).lt(Expr::col(courses::Column::MaxSeats)),
        )
    } else {
        update.filter(courses::Column::OccupiedSeats.gt(0))
    };

    let result = update.exec(conn).await?;
    if result.rows_affected > 0 {
        tracing::debug!(%course_id, step, "seat counter adjusted");
        return Ok(OccupancyChange::Applied);
    }

    if step > 0 {
        Ok(OccupancyChange::Full)
    } else {
        tracing::warn!(%course_id, "seat counter already at zero; release clamped");
        Ok(OccupancyChange::Clamped)
    }
}

/// Recompute `occupied_seats` from the orders that hold a seat. Returns the
/// previous and the new value.
///
/// The course row stays locked until the new value is written, so an
/// enrollment cannot land between the count and the write.
pub async fn reconcile_occupancy(
    db: &DatabaseConnection,
    course_id: Uuid,
) -> Result<(i32, i32), AppError> {
    let txn = db.begin().await?;

    let course = lock_course(&txn, course_id)
        .await?
        .ok_or_else(|| AppError::course_not_found(course_id))?;

    let active = count_active_orders(&txn, course_id).await?;
    let active = i32::try_from(active).unwrap_or(i32::MAX);

    if active == course.occupied_seats {
        txn.commit().await?;
        return Ok((active, active));
    }

    tracing::warn!(
        %course_id,
        cached = course.occupied_seats,
        actual = active,
        "seat counter drifted; resetting"
    );
    let previous = course.occupied_seats;
    let mut model: courses::ActiveModel = course.into();
    model.occupied_seats = Set(active);
    model.update(&txn).await?;
    txn.commit().await?;

    Ok((previous, active))
}

/// `SELECT ... FOR UPDATE` on one course row. Seat adjustments on the same
/// row wait until the surrounding transaction ends.
async fn lock_course<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<courses::Model>, DbErr> {
    courses::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await
}

/// Orders currently holding a seat on the course.
pub async fn count_active_orders<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
) -> Result<u64, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::CourseId.eq(course_id))
        .filter(orders::Column::Status.is_in([Status::Paid, Status::InProgress]))
        .count(conn)
        .await
}

/// Insert a new course owned by `teacher_id`.
pub async fn insert_course(
    db: &DatabaseConnection,
    input: CreateCourse,
    teacher_id: Uuid,
) -> Result<courses::Model, AppError> {
    input.validate().map_err(AppError::Validation)?;

    let new_course = courses::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        level: Set(input.level),
        price: Set(input.price),
        teacher_id: Set(Some(teacher_id)),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        max_seats: Set(input.max_seats.unwrap_or(20)),
        occupied_seats: Set(0),
        created_at: Set(chrono::Utc::now()),
    };

    Ok(new_course.insert(db).await?)
}

/// Fetch a single course by ID.
pub async fn get_course_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<courses::Model>, DbErr> {
    courses::Entity::find_by_id(id).one(conn).await
}

/// Courses that still have a free seat, earliest start first.
pub async fn get_available_courses(
    db: &DatabaseConnection,
    query: &CourseListQuery,
) -> Result<Vec<courses::Model>, DbErr> {
    let mut select = courses::Entity::find().filter(
        Expr::col(courses::Column::OccupiedSeats).lt(Expr::col(courses::Column::MaxSeats)),
    );

    if let Some(level) = query.level {
        select = select.filter(courses::Column::Level.eq(level));
    }

    let found = select
        .order_by_asc(courses::Column::StartDate)
        .all(db)
        .await?;

    let search = query
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    Ok(match search {
        Some(needle) => found
            .into_iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.description.to_lowercase().contains(&needle)
            })
            .collect(),
        None => found,
    })
}

/// Courses taught by a teacher, latest start first.
pub async fn get_courses_by_teacher(
    db: &DatabaseConnection,
    teacher_id: Uuid,
) -> Result<Vec<courses::Model>, DbErr> {
    courses::Entity::find()
        .filter(courses::Column::TeacherId.eq(teacher_id))
        .order_by_desc(courses::Column::StartDate)
        .all(db)
        .await
}

/// Update an existing course. Never touches the seat counter.
///
/// The row is locked while the edit is validated against the current seat
/// count, and a new capacity is only written if it still covers the
/// occupied seats.
pub async fn update_course(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCourse,
) -> Result<courses::Model, AppError> {
    let txn = db.begin().await?;

    let course = lock_course(&txn, id)
        .await?
        .ok_or_else(|| AppError::course_not_found(id))?;

    input
        .validate_against(&course)
        .map_err(AppError::Validation)?;

    let mut active: courses::ActiveModel = course.into();

    if let Some(name) = input.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = input.description {
        active.description = Set(description);
    }
    if let Some(level) = input.level {
        active.level = Set(level);
    }
    if let Some(price) = input.price {
        active.price = Set(price);
    }
    if let Some(start_date) = input.start_date {
        active.start_date = Set(start_date);
    }
    if let Some(end_date) = input.end_date {
        active.end_date = Set(end_date);
    }
    if let Some(max_seats) = input.max_seats {
        active.max_seats = Set(max_seats);
    }

    if active.is_changed() {
        let mut update = courses::Entity::update_many()
            .set(active)
            .filter(courses::Column::Id.eq(id));
        if let Some(max_seats) = input.max_seats {
            update = update.filter(courses::Column::OccupiedSeats.lte(max_seats));
        }

        if update.exec(&txn).await?.rows_affected == 0 {
            return Err(AppError::Validation(
                "Maximum seats cannot be lower than the current number of students".to_string(),
            ));
        }
    }

    let updated = get_course_by_id(&txn, id)
        .await?
        .ok_or_else(|| AppError::course_not_found(id))?;
    txn.commit().await?;

    tracing::info!(course_id = %id, max_seats = updated.max_seats, "course updated");
    Ok(updated)
}

/// Delete a course with its modules and orders. Refused while any student
/// holds a seat.
pub async fn delete_course(db: &DatabaseConnection, id: Uuid) -> Result<(), AppError> {
    let txn = db.begin().await?;

    if get_course_by_id(&txn, id).await?.is_none() {
        return Err(AppError::course_not_found(id));
    }
    if count_active_orders(&txn, id).await? > 0 {
        return Err(AppError::CourseHasActiveStudents);
    }

    let order_ids: Vec<Uuid> = orders::Entity::find()
        .filter(orders::Column::CourseId.eq(id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|o| o.id)
        .collect();

    if !order_ids.is_empty() {
        order_modules::Entity::delete_many()
            .filter(order_modules::Column::OrderId.is_in(order_ids.clone()))
            .exec(&txn)
            .await?;
        orders::Entity::delete_many()
            .filter(orders::Column::Id.is_in(order_ids))
            .exec(&txn)
            .await?;
    }
    modules::Entity::delete_many()
        .filter(modules::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    courses::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(course_id = %id, "course deleted");
    Ok(())
}
