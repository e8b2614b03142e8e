use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::authorization::verify_order_owner;
use crate::auth::middleware::AuthenticatedUser;
use crate::cache::CacheData;
use crate::db::courses as course_db;
use crate::db::orders::{self as order_db, ProgressOutcome};
use crate::enrollment::progress;
use crate::error::AppError;
use crate::models::courses::CourseSummary;
use crate::models::modules::ModuleProgress;
use crate::models::orders::{
    self, CancelRequest, CompleteRequest, ProgressResponse, ProgressUpdate, Status, StatusCounts,
};
use crate::notifications::{Notification, NotifierData};

#[derive(Debug, Serialize)]
pub struct MyCourses {
    pub orders: Vec<orders::Model>,
    pub counts: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: orders::Model,
    pub course: CourseSummary,
    pub modules: Vec<ModuleProgress>,
    pub progress: f64,
    pub completed_modules: usize,
    pub total_modules: usize,
    pub days_remaining: i64,
}

impl From<ProgressOutcome> for ProgressResponse {
    fn from(outcome: ProgressOutcome) -> Self {
        let message = if outcome.already_completed {
            "Module was already completed".to_string()
        } else {
            format!("Progress is now {}%", outcome.progress)
        };
        Self {
            success: true,
            progress: outcome.progress,
            completed_modules: outcome.completed_modules,
            total_modules: outcome.total_modules,
            message,
        }
    }
}

/// GET /api/orders — the caller's enrollments with counts per status.
pub async fn my_courses(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let orders = order_db::get_orders_by_student(db.get_ref(), user.id()).await?;
    let counts = StatusCounts::tally(&orders);
    Ok(HttpResponse::Ok().json(MyCourses { orders, counts }))
}

/// GET /api/orders/{id} — one enrollment with module completion flags.
pub async fn get_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    let view = order_db::load_order_view(db.get_ref(), order_id).await?;
    let course = course_db::get_course_by_id(db.get_ref(), view.order.course_id)
        .await?
        .ok_or_else(|| AppError::course_not_found(view.order.course_id))?;

    let module_ids: Vec<Uuid> = view.modules.iter().map(|m| m.id).collect();
    let detail = OrderDetail {
        progress: progress::calculate(&view.completed, &module_ids),
        completed_modules: progress::completed_count(&view.completed, &module_ids),
        total_modules: module_ids.len(),
        days_remaining: view.order.days_remaining(chrono::Utc::now().date_naive()),
        modules: view
            .modules
            .into_iter()
            .map(|module| ModuleProgress {
                completed: view.completed.contains(&module.id),
                module,
            })
            .collect(),
        course: CourseSummary::from(course),
        order: view.order,
    };

    Ok(HttpResponse::Ok().json(detail))
}

/// POST /api/orders/{id}/modules/{module_id}/complete
pub async fn complete_module(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (order_id, module_id) = path.into_inner();
    verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    let outcome = order_db::mark_module_complete(db.get_ref(), order_id, module_id).await?;
    Ok(HttpResponse::Ok().json(ProgressResponse::from(outcome)))
}

/// POST /api/orders/{id}/progress — overwrite progress with a manual value.
pub async fn update_progress(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<ProgressUpdate>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    let outcome = order_db::set_progress(db.get_ref(), order_id, body.progress).await?;
    Ok(HttpResponse::Ok().json(ProgressResponse::from(outcome)))
}

/// POST /api/orders/{id}/complete — finish the course and rate it.
pub async fn complete_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    notifier: web::Data<NotifierData>,
    path: web::Path<Uuid>,
    body: web::Json<CompleteRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let order = verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    // a repeated request is answered before its body is checked
    if order.status == Status::Completed {
        return Ok(already_completed(order));
    }

    let body = body.into_inner();
    if !body.confirm_completion {
        return Err(AppError::Validation(
            "Please confirm that you have finished the course".to_string(),
        ));
    }

    let outcome =
        order_db::complete_order(db.get_ref(), order_id, body.rating, body.feedback).await?;

    if outcome.already_completed {
        return Ok(already_completed(outcome.order));
    }

    cache.invalidate_catalog().await;
    if let Some(course) = course_db::get_course_by_id(db.get_ref(), outcome.order.course_id).await?
    {
        notifier.send(Notification::completed(&user.0, &course));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Congratulations, you have completed the course",
        "order": outcome.order,
    })))
}

fn already_completed(order: orders::Model) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "This course is already completed",
        "order": order,
    }))
}

/// POST /api/orders/{id}/cancel — cancel an enrollment and free its seat.
pub async fn cancel_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
    body: web::Json<CancelRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    if !body.confirm_cancel {
        return Err(AppError::Validation(
            "Please confirm the cancellation".to_string(),
        ));
    }

    let order = order_db::cancel_order(db.get_ref(), order_id, body.reason()).await?;
    cache.invalidate_catalog().await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Your enrollment has been cancelled",
        "order": order,
    })))
}

/// DELETE /api/orders/{id} — remove a completed or cancelled enrollment.
pub async fn delete_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    verify_order_owner(db.get_ref(), order_id, user.id()).await?;

    order_db::delete_order(db.get_ref(), order_id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": format!("Order {order_id} deleted"),
    })))
}
