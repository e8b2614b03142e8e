use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::authorization::{require_teacher, verify_course_owner};
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::CacheData;
use crate::db::courses as course_db;
use crate::db::modules as module_db;
use crate::db::orders as order_db;
use crate::enrollment::progress;
use crate::error::AppError;
use crate::models::courses::{CourseSummary, CreateCourse, UpdateCourse};
use crate::models::modules::{self, AddModules};
use crate::models::orders::{self, StatusCounts};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub courses: Vec<CourseSummary>,
    pub total_courses: usize,
    pub total_students: i64,
    pub total_income: f64,
}

#[derive(Debug, Serialize)]
pub struct TeacherCourseDetail {
    pub course: CourseSummary,
    pub modules: Vec<modules::Model>,
    pub counts: StatusCounts,
    pub average_progress: f64,
    pub total_income: f64,
}

#[derive(Debug, Serialize)]
pub struct CourseStudents {
    pub course: CourseSummary,
    pub orders: Vec<orders::Model>,
    pub counts: StatusCounts,
    pub active: usize,
    pub completed: usize,
    pub total_income: f64,
}

/// GET /api/teacher/courses — the teacher's courses with totals.
pub async fn dashboard(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_teacher(&user.0)?;

    let courses: Vec<CourseSummary> = course_db::get_courses_by_teacher(db.get_ref(), user.id())
        .await?
        .into_iter()
        .map(CourseSummary::from)
        .collect();

    Ok(HttpResponse::Ok().json(Dashboard {
        total_courses: courses.len(),
        total_students: courses
            .iter()
            .map(|c| i64::from(c.course.occupied_seats))
            .sum(),
        total_income: courses.iter().map(|c| c.total_income).sum(),
        courses,
    }))
}

/// POST /api/teacher/courses — publish a new course.
pub async fn create_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    body: web::Json<CreateCourse>,
) -> Result<HttpResponse, AppError> {
    require_teacher(&user.0)?;

    let course = course_db::insert_course(db.get_ref(), body.into_inner(), user.id()).await?;
    cache.invalidate_catalog().await;

    tracing::info!(course_id = %course.id, teacher_id = %user.id(), "course created");
    Ok(HttpResponse::Created().json(CourseSummary::from(course)))
}

/// GET /api/teacher/courses/{id} — modules, order counts and average progress.
pub async fn course_detail(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    let modules = module_db::get_modules_by_course(db.get_ref(), course.id).await?;
    let orders = order_db::get_orders_by_course(db.get_ref(), course.id).await?;
    let stored: Vec<i32> = orders.iter().map(|o| o.progress).collect();

    Ok(HttpResponse::Ok().json(TeacherCourseDetail {
        counts: StatusCounts::tally(&orders),
        average_progress: progress::average(&stored),
        total_income: course.total_income(),
        course: CourseSummary::from(course),
        modules,
    }))
}

/// PUT /api/teacher/courses/{id} — edit a course the caller teaches.
pub async fn edit_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCourse>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    let updated = course_db::update_course(db.get_ref(), course.id, body.into_inner()).await?;
    cache.invalidate_catalog().await;

    Ok(HttpResponse::Ok().json(CourseSummary::from(updated)))
}

/// DELETE /api/teacher/courses/{id} — only when no student holds a seat.
pub async fn delete_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    course_db::delete_course(db.get_ref(), course.id).await?;
    cache.invalidate_catalog().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Course \"{}\" deleted", course.name),
    })))
}

/// POST /api/teacher/courses/{id}/modules — append modules.
pub async fn add_modules(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<AddModules>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    let created = module_db::insert_modules(db.get_ref(), course.id, body.into_inner()).await?;
    cache.invalidate_catalog().await;

    Ok(HttpResponse::Created().json(created))
}

/// DELETE /api/teacher/courses/{id}/modules/{module_id}
pub async fn delete_module(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (course_id, module_id) = path.into_inner();
    let course = verify_course_owner(db.get_ref(), course_id, &user.0).await?;

    module_db::delete_module(db.get_ref(), course.id, module_id).await?;
    cache.invalidate_catalog().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Module {module_id} deleted"),
    })))
}

/// GET /api/teacher/courses/{id}/students — every enrollment on the course.
pub async fn course_students(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    let orders = order_db::get_orders_by_course(db.get_ref(), course.id).await?;
    let counts = StatusCounts::tally(&orders);

    Ok(HttpResponse::Ok().json(CourseStudents {
        active: counts.active(),
        completed: counts.completed,
        total_income: course.total_income(),
        course: CourseSummary::from(course),
        orders,
        counts,
    }))
}

/// POST /api/teacher/courses/{id}/reconcile — recount occupied seats.
pub async fn reconcile_occupancy(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let course = verify_course_owner(db.get_ref(), path.into_inner(), &user.0).await?;

    let (previous, current) = course_db::reconcile_occupancy(db.get_ref(), course.id).await?;
    if previous != current {
        cache.invalidate_catalog().await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "previous": previous,
        "occupied_seats": current,
    })))
}
