use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::{CacheData, keys};
use crate::config::AppConfig;
use crate::db::courses as course_db;
use crate::db::modules as module_db;
use crate::db::orders as order_db;
use crate::error::AppError;
use crate::models::courses::{CourseListQuery, CourseSummary};
use crate::models::modules;
use crate::models::orders::{self, EnrollRequest};
use crate::notifications::{Notification, NotifierData};

/// The cacheable part of a course page: the same for every visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub course: CourseSummary,
    pub modules: Vec<modules::Model>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub is_enrolled: bool,
    pub order: Option<orders::Model>,
}

/// GET /api/courses — courses with a free seat.
/// Query params: ?level=B1&search=business
pub async fn list_courses(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    query: web::Query<CourseListQuery>,
) -> Result<HttpResponse, AppError> {
    let cache_key = keys::course_list(&query.cache_fragment());

    if let Some(cached) = cache.fetch::<Vec<CourseSummary>>(&cache_key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let courses: Vec<CourseSummary> = course_db::get_available_courses(db.get_ref(), &query)
        .await?
        .into_iter()
        .map(CourseSummary::from)
        .collect();

    cache.store(&cache_key, &courses).await;
    Ok(HttpResponse::Ok().json(courses))
}

/// GET /api/courses/{id} — course with its modules and the caller's enrollment.
pub async fn get_course(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let cache_key = keys::course(id);

    let entry = match cache.fetch::<CatalogEntry>(&cache_key).await {
        Some(entry) => entry,
        None => {
            let course = course_db::get_course_by_id(db.get_ref(), id)
                .await?
                .ok_or_else(|| AppError::course_not_found(id))?;
            let modules = module_db::get_modules_by_course(db.get_ref(), id).await?;
            let entry = CatalogEntry {
                course: CourseSummary::from(course),
                modules,
            };
            cache.store(&cache_key, &entry).await;
            entry
        }
    };

    let order = order_db::get_order_for(db.get_ref(), id, user.id()).await?;

    Ok(HttpResponse::Ok().json(CourseDetail {
        entry,
        is_enrolled: order.is_some(),
        order,
    }))
}

/// POST /api/courses/{id}/enroll — take a seat on the course.
pub async fn enroll(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<CacheData>,
    notifier: web::Data<NotifierData>,
    config: web::Data<AppConfig>,
    path: web::Path<Uuid>,
    body: web::Json<EnrollRequest>,
) -> Result<HttpResponse, AppError> {
    let course_id = path.into_inner();
    let body = body.into_inner();

    if !body.agree_terms {
        return Err(AppError::Validation(
            "You must accept the terms and conditions".to_string(),
        ));
    }

    let order = order_db::enroll(
        db.get_ref(),
        course_id,
        user.id(),
        body.notes,
        config.reenrollment,
    )
    .await?;
    cache.invalidate_catalog().await;

    if let Some(course) = course_db::get_course_by_id(db.get_ref(), course_id).await? {
        notifier.send(Notification::enrolled(&user.0, &course));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "You are enrolled in the course",
        "order": order,
    })))
}
