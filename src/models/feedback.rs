use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum FeedbackType {
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "technical")]
    Technical,
    #[sea_orm(string_value = "suggestion")]
    Suggestion,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum WouldRecommend {
    #[sea_orm(string_value = "definitely")]
    Definitely,
    #[sea_orm(string_value = "probably")]
    Probably,
    #[sea_orm(string_value = "not_sure")]
    NotSure,
    #[sea_orm(string_value = "probably_not")]
    ProbablyNot,
    #[sea_orm(string_value = "definitely_not")]
    DefinitelyNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Satisfaction {
    #[sea_orm(string_value = "very_satisfied")]
    VerySatisfied,
    #[sea_orm(string_value = "satisfied")]
    Satisfied,
    #[sea_orm(string_value = "neutral")]
    Neutral,
    #[sea_orm(string_value = "unsatisfied")]
    Unsatisfied,
    #[sea_orm(string_value = "very_unsatisfied")]
    VeryUnsatisfied,
}

/// SeaORM entity for the `feedback` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedback")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub feedback_type: FeedbackType,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub site_design_rating: i32,
    pub usability_rating: i32,
    pub content_rating: i32,
    pub speed_rating: i32,
    pub would_recommend: Option<WouldRecommend>,
    pub overall_satisfaction: Option<Satisfaction>,
    #[sea_orm(column_type = "Text")]
    pub most_liked: String,
    #[sea_orm(column_type = "Text")]
    pub improvements: String,
    #[sea_orm(column_type = "Text")]
    pub suggestions: String,
    #[sea_orm(column_type = "Text")]
    pub additional_comments: String,
    #[sea_orm(column_type = "Double")]
    pub average_rating: f64,
    pub total_score: i32,
    pub max_possible_score: i32,
    #[sea_orm(column_type = "Double")]
    pub sentiment_score: f64,
    pub is_processed: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn score_percentage(&self) -> f64 {
        crate::feedback::score_percentage(self.total_score, self.max_possible_score)
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitFeedback {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub feedback_type: Option<FeedbackType>,
    pub subject: String,
    pub message: String,
    pub site_design_rating: i32,
    pub usability_rating: i32,
    pub content_rating: i32,
    pub speed_rating: i32,
    pub would_recommend: Option<WouldRecommend>,
    pub overall_satisfaction: Option<Satisfaction>,
    pub most_liked: String,
    pub improvements: String,
    pub suggestions: String,
    pub additional_comments: String,
}

impl SubmitFeedback {
    pub fn validate(&self) -> Result<(), String> {
        if self.subject.trim().is_empty() {
            return Err("Subject is required".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("Message is required".to_string());
        }
        for (label, rating) in self.ratings_labelled() {
            if !(0..=5).contains(&rating) {
                return Err(format!("{label} rating must be between 0 and 5"));
            }
        }
        Ok(())
    }

    pub fn ratings(&self) -> [i32; 4] {
        [
            self.site_design_rating,
            self.usability_rating,
            self.content_rating,
            self.speed_rating,
        ]
    }

    fn ratings_labelled(&self) -> [(&'static str, i32); 4] {
        [
            ("Design", self.site_design_rating),
            ("Usability", self.usability_rating),
            ("Content", self.content_rating),
            ("Speed", self.speed_rating),
        ]
    }

    /// Free-text answers that feed the sentiment score.
    pub fn texts(&self) -> [&str; 5] {
        [
            &self.message,
            &self.most_liked,
            &self.improvements,
            &self.suggestions,
            &self.additional_comments,
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    #[serde(flatten)]
    pub feedback: Model,
    pub score_percentage: f64,
}

impl From<Model> for FeedbackResponse {
    fn from(feedback: Model) -> Self {
        Self {
            score_percentage: feedback.score_percentage(),
            feedback,
        }
    }
}

/// An answer as shown on the public feed. Contact details stay private.
#[derive(Debug, Clone, Serialize)]
pub struct PublicFeedback {
    pub id: Uuid,
    pub name: String,
    pub subject: String,
    pub message: String,
    pub feedback_type: FeedbackType,
    pub average_rating: f64,
    pub total_score: i32,
    pub created_at: DateTimeUtc,
    pub likes_count: u64,
    pub user_has_liked: bool,
}

impl PublicFeedback {
    pub fn new(feedback: Model, likes_count: u64, user_has_liked: bool) -> Self {
        Self {
            id: feedback.id,
            name: feedback.name,
            subject: feedback.subject,
            message: feedback.message,
            feedback_type: feedback.feedback_type,
            average_rating: feedback.average_rating,
            total_score: feedback.total_score,
            created_at: feedback.created_at,
            likes_count,
            user_has_liked,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicFeedbackPage {
    pub feedbacks: Vec<PublicFeedback>,
    pub has_more: bool,
    pub current_page: u64,
}

/// State of a like after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub likes_count: u64,
}

/// Site-wide survey averages, one decimal. All zero before the first answer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FeedbackStats {
    pub total_feedbacks: u64,
    pub average_rating: f64,
    pub average_design: f64,
    pub average_usability: f64,
    pub average_content: f64,
    pub average_speed: f64,
    pub average_sentiment: f64,
}
