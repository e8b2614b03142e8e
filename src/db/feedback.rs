use sea_orm::prelude::Expr;
use sea_orm::sea_query::Func;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::feedback::{FeedbackScores, SentimentScorer, round_to};
use crate::models::feedback::{
    self, FeedbackStats, FeedbackType, LikeToggle, PublicFeedback, PublicFeedbackPage,
    SubmitFeedback,
};
use crate::models::feedback_likes;

/// Store a survey answer with its derived scores.
pub async fn insert_feedback(
    db: &DatabaseConnection,
    user_id: Option<Uuid>,
    input: SubmitFeedback,
    scorer: &dyn SentimentScorer,
) -> Result<feedback::Model, AppError> {
    input.validate().map_err(AppError::Validation)?;

    let scores = FeedbackScores::compute(&input, scorer);

    let new_feedback = feedback::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        feedback_type: Set(input.feedback_type.unwrap_or(FeedbackType::General)),
        subject: Set(input.subject),
        message: Set(input.message),
        site_design_rating: Set(input.site_design_rating),
        usability_rating: Set(input.usability_rating),
        content_rating: Set(input.content_rating),
        speed_rating: Set(input.speed_rating),
        would_recommend: Set(input.would_recommend),
        overall_satisfaction: Set(input.overall_satisfaction),
        most_liked: Set(input.most_liked),
        improvements: Set(input.improvements),
        suggestions: Set(input.suggestions),
        additional_comments: Set(input.additional_comments),
        average_rating: Set(scores.average_rating),
        total_score: Set(scores.total_score),
        max_possible_score: Set(scores.max_possible_score),
        sentiment_score: Set(scores.sentiment_score),
        is_processed: Set(false),
        created_at: Set(chrono::Utc::now()),
    };

    Ok(new_feedback.insert(db).await?)
}

/// A user's survey answers, newest first, paginated.
pub async fn get_feedback_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    page: u64,
    limit: u64,
) -> Result<Vec<feedback::Model>, DbErr> {
    feedback::Entity::find()
        .filter(feedback::Column::UserId.eq(user_id))
        .order_by_desc(feedback::Column::CreatedAt)
        .paginate(db, Ord::max(limit, 1))
        .fetch_page(page.saturating_sub(1))
        .await
}

/// Every answer, newest first, with its like count and whether `viewer`
/// liked it.
pub async fn get_public_feedback(
    db: &DatabaseConnection,
    viewer: Option<Uuid>,
    page: u64,
    limit: u64,
) -> Result<PublicFeedbackPage, DbErr> {
    let page = Ord::max(page, 1);
    let paginator = feedback::Entity::find()
        .order_by_desc(feedback::Column::CreatedAt)
        .order_by_desc(feedback::Column::Id)
        .paginate(db, Ord::max(limit, 1));

    let total_pages = paginator.num_pages().await?;
    let records = paginator.fetch_page(page - 1).await?;

    let ids: Vec<Uuid> = records.iter().map(|f| f.id).collect();
    let likes = if ids.is_empty() {
        Vec::new()
    } else {
        feedback_likes::Entity::find()
            .filter(feedback_likes::Column::FeedbackId.is_in(ids))
            .all(db)
            .await?
    };

    let mut counts: HashMap<Uuid, u64> = HashMap::new();
    let mut liked_by_viewer = Vec::new();
    for like in likes {
        *counts.entry(like.feedback_id).or_default() += 1;
        if Some(like.user_id) == viewer {
            liked_by_viewer.push(like.feedback_id);
        }
    }

    let feedbacks = records
        .into_iter()
        .map(|f| {
            let likes_count = counts.get(&f.id).copied().unwrap_or(0);
            let user_has_liked = liked_by_viewer.contains(&f.id);
            PublicFeedback::new(f, likes_count, user_has_liked)
        })
        .collect();

    Ok(PublicFeedbackPage {
        feedbacks,
        has_more: page < total_pages,
        current_page: page,
    })
}

/// Like an answer, or take the like back if the user already gave one.
pub async fn toggle_like(
    db: &DatabaseConnection,
    feedback_id: Uuid,
    user_id: Uuid,
) -> Result<LikeToggle, AppError> {
    let txn = db.begin().await?;

    if feedback::Entity::find_by_id(feedback_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Feedback not found".to_string()));
    }

    let removed = feedback_likes::Entity::delete_many()
        .filter(feedback_likes::Column::FeedbackId.eq(feedback_id))
        .filter(feedback_likes::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?
        .rows_affected;

    let liked = removed == 0;
    if liked {
        // a concurrent toggle may have inserted the same pair; keep that row
        feedback_likes::Entity::insert(feedback_likes::ActiveModel {
            id: Set(Uuid::new_v4()),
            feedback_id: Set(feedback_id),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now()),
        })
        .on_conflict_do_nothing_on([
            feedback_likes::Column::FeedbackId,
            feedback_likes::Column::UserId,
        ])
        .exec_without_returning(&txn)
        .await?;
    }

    let likes_count = feedback_likes::Entity::find()
        .filter(feedback_likes::Column::FeedbackId.eq(feedback_id))
        .count(&txn)
        .await?;
    txn.commit().await?;

    tracing::debug!(%feedback_id, %user_id, liked, likes_count, "feedback like toggled");
    Ok(LikeToggle { liked, likes_count })
}

#[derive(Debug, FromQueryResult)]
struct StatsRow {
    total: i64,
    rating_sum: Option<f64>,
    design_sum: Option<i64>,
    usability_sum: Option<i64>,
    content_sum: Option<i64>,
    speed_sum: Option<i64>,
    sentiment_sum: Option<f64>,
}

/// Site-wide averages over every stored answer.
pub async fn feedback_stats(db: &DatabaseConnection) -> Result<FeedbackStats, DbErr> {
    let sum = |col: feedback::Column| Expr::from(Func::sum(Expr::col(col)));

    let row = feedback::Entity::find()
        .select_only()
        .column_as(Expr::from(Func::count(Expr::col(feedback::Column::Id))), "total")
        .column_as(sum(feedback::Column::AverageRating), "rating_sum")
        .column_as(sum(feedback::Column::SiteDesignRating), "design_sum")
        .column_as(sum(feedback::Column::UsabilityRating), "usability_sum")
        .column_as(sum(feedback::Column::ContentRating), "content_sum")
        .column_as(sum(feedback::Column::SpeedRating), "speed_sum")
        .column_as(sum(feedback::Column::SentimentScore), "sentiment_sum")
        .into_model::<StatsRow>()
        .one(db)
        .await?;

    let Some(row) = row.filter(|r| r.total > 0) else {
        return Ok(FeedbackStats::default());
    };

    let total = row.total as f64;
    let average = |sum: f64| round_to(sum / total, 1);
    let average_int = |sum: Option<i64>| average(sum.unwrap_or(0) as f64);

    Ok(FeedbackStats {
        total_feedbacks: row.total as u64,
        average_rating: average(row.rating_sum.unwrap_or(0.0)),
        average_design: average_int(row.design_sum),
        average_usability: average_int(row.usability_sum),
        average_content: average_int(row.content_sum),
        average_speed: average_int(row.speed_sum),
        average_sentiment: average(row.sentiment_sum.unwrap_or(0.0)),
    })
}
