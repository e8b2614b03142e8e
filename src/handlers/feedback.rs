use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::feedback as feedback_db;
use crate::error::AppError;
use crate::feedback::ScorerData;
use crate::models::PaginationQuery;
use crate::models::feedback::{FeedbackResponse, SubmitFeedback};
use crate::notifications::{Notification, NotifierData};

/// POST /api/feedback — store a survey answer with its derived scores.
pub async fn submit_feedback(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    scorer: web::Data<ScorerData>,
    notifier: web::Data<NotifierData>,
    body: web::Json<SubmitFeedback>,
) -> Result<HttpResponse, AppError> {
    let mut input = body.into_inner();
    if input.email.trim().is_empty() {
        input.email = user.0.email.clone();
    }

    let record =
        feedback_db::insert_feedback(db.get_ref(), Some(user.id()), input, &**scorer.get_ref())
            .await?;

    tracing::info!(
        feedback_id = %record.id,
        total_score = record.total_score,
        "feedback received"
    );
    if let Some(mail) = Notification::feedback_received(&record) {
        notifier.send(mail);
    }

    Ok(HttpResponse::Created().json(FeedbackResponse::from(record)))
}

/// GET /api/feedback — the caller's survey answers, newest first.
/// Query params: ?page=1&limit=20
pub async fn my_feedback(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let records =
        feedback_db::get_feedback_by_user(db.get_ref(), user.id(), query.page(), query.limit())
            .await?;
    let response: Vec<FeedbackResponse> = records.into_iter().map(FeedbackResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/feedback/public — every answer, newest first, with like counts.
/// Query params: ?page=1&limit=20. A bearer token, when present, fills in
/// `user_has_liked`.
pub async fn public_feedback(
    user: Option<AuthenticatedUser>,
    db: web::Data<DatabaseConnection>,
    query: web::Query<PaginationQuery>,
) -> Result<HttpResponse, AppError> {
    let viewer = user.as_ref().map(AuthenticatedUser::id);
    let page =
        feedback_db::get_public_feedback(db.get_ref(), viewer, query.page(), query.limit())
            .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// POST /api/feedback/{id}/like — like an answer, or take the like back.
pub async fn toggle_like(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let toggle = feedback_db::toggle_like(db.get_ref(), path.into_inner(), user.id()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "action": if toggle.liked { "liked" } else { "unliked" },
        "likes_count": toggle.likes_count,
        "user_has_liked": toggle.liked,
    })))
}

/// GET /api/feedback/stats — site-wide survey averages.
pub async fn feedback_stats(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let stats = feedback_db::feedback_stats(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}
