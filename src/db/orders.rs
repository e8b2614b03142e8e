//! Enrollment ledger: every operation that creates, moves or removes a
//! course order. Each runs in one transaction and funnels seat-counter
//! changes through [`course_db::adjust_occupancy`].

use chrono::Utc;
use sea_orm::*;
use std::collections::HashSet;
use uuid::Uuid;

use crate::db::courses::{self as course_db, OccupancyChange};
use crate::db::modules as module_db;
use crate::enrollment::{ReenrollmentPolicy, capacity, progress, transitions};
use crate::error::AppError;
use crate::models::modules;
use crate::models::order_modules;
use crate::models::orders::{self, Status};

/// State of an order after a progress-changing operation.
#[derive(Debug, Clone)]
pub struct ProgressOutcome {
    pub order: orders::Model,
    /// Calculated percentage, one decimal.
    pub progress: f64,
    pub completed_modules: usize,
    pub total_modules: usize,
    /// The module was already in the completed set; nothing changed.
    pub already_completed: bool,
}

#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub order: orders::Model,
    pub already_completed: bool,
}

/// An order as shown to its student, after lazy reconciliation.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: orders::Model,
    pub modules: Vec<modules::Model>,
    pub completed: HashSet<Uuid>,
}

/// Fetch a single order by ID.
pub async fn get_order_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(id).one(conn).await
}

/// The order a student holds for a course, if any.
pub async fn get_order_for<C: ConnectionTrait>(
    conn: &C,
    course_id: Uuid,
    student_id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::CourseId.eq(course_id))
        .filter(orders::Column::StudentId.eq(student_id))
        .one(conn)
        .await
}

/// A student's orders, newest first.
pub async fn get_orders_by_student(
    db: &DatabaseConnection,
    student_id: Uuid,
) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::StudentId.eq(student_id))
        .order_by_desc(orders::Column::OrderDate)
        .all(db)
        .await
}

/// All orders on a course, newest first.
pub async fn get_orders_by_course(
    db: &DatabaseConnection,
    course_id: Uuid,
) -> Result<Vec<orders::Model>, DbErr> {
    orders::Entity::find()
        .filter(orders::Column::CourseId.eq(course_id))
        .order_by_desc(orders::Column::OrderDate)
        .all(db)
        .await
}

/// IDs of the modules an order has completed.
pub async fn get_completed_module_ids<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<HashSet<Uuid>, DbErr> {
    Ok(order_modules::Entity::find()
        .filter(order_modules::Column::OrderId.eq(order_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.module_id)
        .collect())
}

async fn find_order<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<orders::Model, AppError> {
    get_order_by_id(conn, id)
        .await?
        .ok_or_else(|| AppError::order_not_found(id))
}

/// Move `order` to `next`, applying the seat-counter delta exactly once.
/// Leaves `active.status` set; the caller saves the row.
async fn apply_status<C: ConnectionTrait>(
    conn: &C,
    order: &orders::Model,
    active: &mut orders::ActiveModel,
    next: Status,
) -> Result<(), AppError> {
    if order.status == next {
        return Ok(());
    }
    if !order.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: next,
        });
    }

    let delta = transitions::seat_delta(Some(order.status), next);
    if course_db::adjust_occupancy(conn, order.course_id, delta).await? == OccupancyChange::Full {
        return Err(AppError::CourseFull);
    }

    tracing::info!(
        order_id = %order.id,
        course_id = %order.course_id,
        from = %order.status,
        to = %next,
        "order status changed"
    );
    active.status = Set(next);
    Ok(())
}

/// Record completed modules. Rows that already exist are skipped; returns
/// how many were new.
async fn insert_completions<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    module_ids: impl IntoIterator<Item = Uuid>,
) -> Result<u64, DbErr> {
    let now = Utc::now();
    let rows: Vec<order_modules::ActiveModel> = module_ids
        .into_iter()
        .map(|module_id| order_modules::ActiveModel {
            order_id: Set(order_id),
            module_id: Set(module_id),
            completed_at: Set(now),
        })
        .collect();

    let inserted = order_modules::Entity::insert_many(rows)
        .on_conflict_do_nothing()
        .exec_without_returning(conn)
        .await?;

    Ok(match inserted {
        TryInsertResult::Inserted(count) => count,
        TryInsertResult::Empty | TryInsertResult::Conflicted => 0,
    })
}

async fn clear_completions<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<(), DbErr> {
    order_modules::Entity::delete_many()
        .filter(order_modules::Column::OrderId.eq(order_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Enroll a student in a course.
///
/// The order starts `paid` at the current course price and takes one seat.
/// The seat is claimed with a conditional update, so two concurrent
/// enrollments for the last seat cannot both succeed.
pub async fn enroll(
    db: &DatabaseConnection,
    course_id: Uuid,
    student_id: Uuid,
    notes: String,
    policy: ReenrollmentPolicy,
) -> Result<orders::Model, AppError> {
    let txn = db.begin().await?;

    let course = course_db::get_course_by_id(&txn, course_id)
        .await?
        .ok_or_else(|| AppError::course_not_found(course_id))?;

    if let Some(existing) = get_order_for(&txn, course_id, student_id).await? {
        match policy {
            ReenrollmentPolicy::AllowAfterTerminal if existing.status.is_terminal() => {
                tracing::info!(
                    order_id = %existing.id,
                    status = %existing.status,
                    "replacing settled order on re-enrollment"
                );
                clear_completions(&txn, existing.id).await?;
                orders::Entity::delete_by_id(existing.id).exec(&txn).await?;
            }
            _ => return Err(AppError::AlreadyEnrolled),
        }
    }

    if !capacity::is_available(&course) {
        return Err(AppError::CourseFull);
    }

    let status = Status::Paid;
    let delta = transitions::seat_delta(None, status);
    if course_db::adjust_occupancy(&txn, course.id, delta).await? == OccupancyChange::Full {
        return Err(AppError::CourseFull);
    }

    let now = Utc::now();
    let new_order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        course_id: Set(course.id),
        student_id: Set(student_id),
        status: Set(status),
        progress: Set(0),
        price_paid: Set(course.price),
        notes: Set(notes.trim().to_string()),
        start_date: Set(now.date_naive()),
        expected_end_date: Set(course.end_date),
        actual_end_date: Set(None),
        rating: Set(None),
        feedback: Set(String::new()),
        cancellation_reason: Set(String::new()),
        order_date: Set(now),
        last_activity: Set(now),
    };

    let order = new_order
        .insert(&txn)
        .await
        .map_err(AppError::from_order_insert)?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, %course_id, %student_id, "student enrolled");
    Ok(order)
}

/// Add a module to an order's completed set and recompute its progress.
///
/// Completing a module twice is a no-op reported through
/// `already_completed`.
pub async fn mark_module_complete(
    db: &DatabaseConnection,
    order_id: Uuid,
    module_id: Uuid,
) -> Result<ProgressOutcome, AppError> {
    let txn = db.begin().await?;

    let order = find_order(&txn, order_id).await?;
    let module = module_db::get_module_in_course(&txn, order.course_id, module_id)
        .await?
        .ok_or(AppError::ModuleNotInCourse(module_id))?;

    let course_modules = module_db::get_module_ids(&txn, order.course_id).await?;
    let mut completed = get_completed_module_ids(&txn, order.id).await?;

    let unchanged = |order: orders::Model, completed: &HashSet<Uuid>| ProgressOutcome {
        progress: progress::calculate(completed, &course_modules),
        completed_modules: progress::completed_count(completed, &course_modules),
        total_modules: course_modules.len(),
        order,
        already_completed: true,
    };

    if completed.contains(&module.id) {
        txn.commit().await?;
        return Ok(unchanged(order, &completed));
    }

    if order.status.is_terminal() {
        return Err(AppError::OrderClosed(order.status));
    }

    // a concurrent request may have recorded the module after our read
    let inserted = insert_completions(&txn, order.id, [module.id]).await?;
    completed.insert(module.id);
    if inserted == 0 {
        let order = find_order(&txn, order.id).await?;
        txn.commit().await?;
        tracing::debug!(order_id = %order.id, module_id = %module.id, "module already recorded");
        return Ok(unchanged(order, &completed));
    }

    let percent = progress::calculate(&completed, &course_modules);
    let mut active: orders::ActiveModel = order.clone().into();
    if let Some(next) = transitions::promotion(order.status, percent) {
        apply_status(&txn, &order, &mut active, next).await?;
    }
    active.progress = Set(progress::stored(percent));
    active.last_activity = Set(Utc::now());

    let order = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ProgressOutcome {
        completed_modules: progress::completed_count(&completed, &course_modules),
        total_modules: course_modules.len(),
        progress: percent,
        order,
        already_completed: false,
    })
}

/// Overwrite an order's progress.
///
/// The completed set is rebuilt from scratch: it becomes the first
/// `round(percent / 100 * total)` modules in course sequence, whatever was
/// completed before.
pub async fn set_progress(
    db: &DatabaseConnection,
    order_id: Uuid,
    percent: i64,
) -> Result<ProgressOutcome, AppError> {
    let percent = percent.clamp(0, 100) as i32;
    let txn = db.begin().await?;

    let order = find_order(&txn, order_id).await?;
    if order.status.is_terminal() {
        return Err(AppError::OrderClosed(order.status));
    }

    let course_modules = module_db::get_module_ids(&txn, order.course_id).await?;
    let wanted = progress::modules_for_percent(percent, course_modules.len());

    clear_completions(&txn, order.id).await?;
    insert_completions(&txn, order.id, course_modules.iter().take(wanted).copied()).await?;

    let mut active: orders::ActiveModel = order.clone().into();
    if let Some(next) = transitions::promotion(order.status, f64::from(percent)) {
        apply_status(&txn, &order, &mut active, next).await?;
    }
    active.progress = Set(percent);
    active.last_activity = Set(Utc::now());

    let order = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ProgressOutcome {
        order,
        progress: f64::from(percent),
        completed_modules: wanted,
        total_modules: course_modules.len(),
        already_completed: false,
    })
}

/// Finish a course: every module done and progress at 100%.
///
/// Completing an already completed order changes nothing and reports
/// `already_completed`.
pub async fn complete_order(
    db: &DatabaseConnection,
    order_id: Uuid,
    rating: Option<i32>,
    feedback: Option<String>,
) -> Result<CompletionOutcome, AppError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    if order.status == Status::Completed {
        txn.commit().await?;
        return Ok(CompletionOutcome {
            order,
            already_completed: true,
        });
    }
    if order.status.is_terminal() {
        return Err(AppError::InvalidTransition {
            from: order.status,
            to: Status::Completed,
        });
    }

    let course_modules = module_db::get_module_ids(&txn, order.course_id).await?;
    let completed = get_completed_module_ids(&txn, order.id).await?;
    if progress::completed_count(&completed, &course_modules) < course_modules.len() {
        return Err(AppError::ModulesIncomplete);
    }
    if order.progress < 100 {
        return Err(AppError::ProgressIncomplete);
    }
    let rating = rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| AppError::Validation("Rating must be between 1 and 5".to_string()))?;

    let mut active: orders::ActiveModel = order.clone().into();
    apply_status(&txn, &order, &mut active, Status::Completed).await?;

    let now = Utc::now();
    active.actual_end_date = Set(Some(now.date_naive()));
    active.progress = Set(100);
    active.rating = Set(Some(rating));
    active.feedback = Set(feedback.map(|f| f.trim().to_string()).unwrap_or_default());
    active.last_activity = Set(now);

    let order = active.update(&txn).await?;
    txn.commit().await?;

    Ok(CompletionOutcome {
        order,
        already_completed: false,
    })
}

/// Cancel a pending, paid or in-progress order, releasing its seat.
pub async fn cancel_order(
    db: &DatabaseConnection,
    order_id: Uuid,
    reason: Option<String>,
) -> Result<orders::Model, AppError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    if !order.status.can_be_cancelled() {
        return Err(AppError::CannotCancel(order.status));
    }

    let mut active: orders::ActiveModel = order.clone().into();
    apply_status(&txn, &order, &mut active, Status::Cancelled).await?;
    if let Some(reason) = reason {
        active.cancellation_reason = Set(reason);
    }
    active.last_activity = Set(Utc::now());

    let order = active.update(&txn).await?;
    txn.commit().await?;
    Ok(order)
}

/// Remove a settled (completed or cancelled) order from the ledger.
pub async fn delete_order(db: &DatabaseConnection, order_id: Uuid) -> Result<(), AppError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    if !order.status.can_be_deleted() {
        return Err(AppError::CannotDeleteActive);
    }

    clear_completions(&txn, order.id).await?;
    orders::Entity::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(%order_id, status = %order.status, "order deleted");
    Ok(())
}

/// Load an order for display, fixing up derived state on the way.
///
/// A `paid` order that already shows progress is promoted, and a stored
/// progress that disagrees with the completed set is rewritten.
pub async fn load_order_view(db: &DatabaseConnection, order_id: Uuid) -> Result<OrderView, AppError> {
    let txn = db.begin().await?;
    let order = find_order(&txn, order_id).await?;

    let modules = module_db::get_modules_by_course(&txn, order.course_id).await?;
    let completed = get_completed_module_ids(&txn, order.id).await?;
    let module_ids: Vec<Uuid> = modules.iter().map(|m| m.id).collect();

    let mut active: orders::ActiveModel = order.clone().into();
    let mut dirty = false;

    if let Some(next) = transitions::promotion(order.status, f64::from(order.progress)) {
        apply_status(&txn, &order, &mut active, next).await?;
        dirty = true;
    }

    if !module_ids.is_empty() {
        let calculated = progress::stored(progress::calculate(&completed, &module_ids));
        if calculated != order.progress && !order.status.is_terminal() {
            active.progress = Set(calculated);
            dirty = true;
        }
    }

    let order = if dirty {
        active.update(&txn).await?
    } else {
        order
    };
    txn.commit().await?;

    Ok(OrderView {
        order,
        modules,
        completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};

    use crate::db::{courses as course_db, users as user_db};
    use crate::models::courses::{CreateCourse, Level};
    use crate::models::modules::{AddModules, CreateModule};
    use crate::models::users::{CreateUserFromAuth, Roles};

    async fn user(db: &DatabaseConnection, role: Roles) -> Uuid {
        let id = Uuid::new_v4();
        user_db::find_or_create_from_auth(
            db,
            CreateUserFromAuth {
                id,
                email: format!("{id}@example.com"),
                display_name: None,
                role,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn recording_a_module_twice_keeps_one_row() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let teacher = user(&db, Roles::Teacher).await;
        let student = user(&db, Roles::Student).await;
        let course = course_db::insert_course(
            &db,
            CreateCourse {
                name: "Pronunciation".to_string(),
                description: String::new(),
                level: Level::A2,
                price: 90.0,
                start_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2026, 4, 27).unwrap(),
                max_seats: Some(4),
            },
            teacher,
        )
        .await
        .unwrap();
        let modules = module_db::insert_modules(
            &db,
            course.id,
            AddModules {
                modules: vec![CreateModule {
                    title: "Vowels".to_string(),
                    description: String::new(),
                    position: 1,
                    duration_hours: None,
                }],
            },
        )
        .await
        .unwrap();
        let order = enroll(&db, course.id, student, String::new(), ReenrollmentPolicy::OncePerCourse)
            .await
            .unwrap();

        // the second insert is what a request racing the first one would do
        assert_eq!(insert_completions(&db, order.id, [modules[0].id]).await.unwrap(), 1);
        assert_eq!(insert_completions(&db, order.id, [modules[0].id]).await.unwrap(), 0);
        assert_eq!(insert_completions(&db, order.id, Vec::new()).await.unwrap(), 0);

        let completed = get_completed_module_ids(&db, order.id).await.unwrap();
        assert_eq!(completed.len(), 1);
    }
}
