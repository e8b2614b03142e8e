use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status stored as a lowercase string in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Status {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Pending => "pending",
            Status::Paid => "paid",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Cancelled => "cancelled",
        })
    }
}

/// SeaORM entity for the `course_orders` table: one student's enrollment in
/// one course. `(course_id, student_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub status: Status,
    /// Whole percent, 0..=100.
    pub progress: i32,
    /// Course price at enrollment time.
    #[sea_orm(column_type = "Double")]
    pub price_paid: f64,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub start_date: Date,
    pub expected_end_date: Date,
    pub actual_end_date: Option<Date>,
    pub rating: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub feedback: String,
    #[sea_orm(column_type = "Text")]
    pub cancellation_reason: String,
    pub order_date: DateTimeUtc,
    pub last_activity: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::order_modules::Entity")]
    CompletedModules,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::order_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompletedModules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Days left until the expected end date, never negative. Completed
    /// orders have none left.
    pub fn days_remaining(&self, today: Date) -> i64 {
        if self.status == Status::Completed {
            return 0;
        }
        (self.expected_end_date - today).num_days().max(0)
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    #[serde(default)]
    pub agree_terms: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub confirm_completion: bool,
    /// 1..=5; only checked when the order is actually being completed.
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub confirm_cancel: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CancelRequest {
    /// The trimmed reason, or `None` when it is blank.
    pub fn reason(&self) -> Option<String> {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    pub progress: i64,
}

/// JSON payload returned by the progress endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressResponse {
    pub success: bool,
    pub progress: f64,
    pub completed_modules: usize,
    pub total_modules: usize,
    pub message: String,
}

/// Number of orders in each status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn tally<'a>(orders: impl IntoIterator<Item = &'a Model>) -> Self {
        let mut counts = Self::default();
        for order in orders {
            counts.total += 1;
            match order.status {
                Status::Pending => counts.pending += 1,
                Status::Paid => counts.paid += 1,
                Status::InProgress => counts.in_progress += 1,
                Status::Completed => counts.completed += 1,
                Status::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    pub fn active(&self) -> usize {
        self.paid + self.in_progress
    }
}
