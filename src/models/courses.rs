use chrono::Datelike;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// CEFR level a course targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum Level {
    #[sea_orm(string_value = "A1")]
    A1,
    #[sea_orm(string_value = "A2")]
    A2,
    #[sea_orm(string_value = "B1")]
    B1,
    #[sea_orm(string_value = "B2")]
    B2,
    #[sea_orm(string_value = "C1")]
    C1,
}

/// SeaORM entity for the `courses` table.
///
/// `occupied_seats` is a cached aggregate of the course's `paid` and
/// `in_progress` orders. It is only ever written through
/// [`crate::db::courses::adjust_occupancy`] and
/// [`crate::db::courses::reconcile_occupancy`].
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub level: Level,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub teacher_id: Option<Uuid>,
    pub start_date: Date,
    pub end_date: Date,
    pub max_seats: i32,
    pub occupied_seats: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::modules::Entity")]
    Modules,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
}

impl Related<super::modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modules.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.teacher_id == Some(user_id)
    }

    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    pub fn duration_weeks(&self) -> i64 {
        self.duration_days().div_euclid(7)
    }

    /// Calendar months between start and end, ignoring the day of month.
    pub fn duration_months(&self) -> i32 {
        (self.end_date.year() - self.start_date.year()) * 12
            + (self.end_date.month() as i32 - self.start_date.month() as i32)
    }

    pub fn total_income(&self) -> f64 {
        f64::from(self.occupied_seats) * self.price
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub name: String,
    pub description: String,
    pub level: Level,
    pub price: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub max_seats: Option<i32>,
}

impl CreateCourse {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Course name must not be empty".to_string());
        }
        validate_dates(self.start_date, self.end_date)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be a non-negative amount".to_string());
        }
        if self.max_seats.is_some_and(|seats| seats < 1) {
            return Err("A course needs at least one seat".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCourse {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: Option<Level>,
    pub price: Option<f64>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub max_seats: Option<i32>,
}

impl UpdateCourse {
    /// Validate the edit against the course it will be applied to.
    pub fn validate_against(&self, course: &Model) -> Result<(), String> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err("Course name must not be empty".to_string());
        }
        validate_dates(
            self.start_date.unwrap_or(course.start_date),
            self.end_date.unwrap_or(course.end_date),
        )?;
        if self.price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err("Price must be a non-negative amount".to_string());
        }
        if let Some(max_seats) = self.max_seats {
            if max_seats < course.occupied_seats {
                return Err(format!(
                    "Maximum seats ({max_seats}) cannot be lower than the current number of students ({})",
                    course.occupied_seats
                ));
            }
            if max_seats < 1 {
                return Err("A course needs at least one seat".to_string());
            }
        }
        Ok(())
    }
}

fn validate_dates(start: Date, end: Date) -> Result<(), String> {
    if end <= start {
        return Err("End date must be later than the start date".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseListQuery {
    pub level: Option<Level>,
    pub search: Option<String>,
}

impl CourseListQuery {
    /// Stable string used as part of the cache key.
    pub fn cache_fragment(&self) -> String {
        format!(
            "level={}&search={}",
            self.level.map(|l| format!("{l:?}")).unwrap_or_default(),
            self.search.as_deref().unwrap_or("").trim().to_lowercase()
        )
    }
}

/// Course plus the values derived from it, as served to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Model,
    pub available_seats: i32,
    pub is_available: bool,
    pub duration_days: i64,
    pub duration_weeks: i64,
    pub duration_months: i32,
    pub total_income: f64,
}

impl From<Model> for CourseSummary {
    fn from(course: Model) -> Self {
        Self {
            available_seats: crate::enrollment::capacity::available_seats(&course),
            is_available: crate::enrollment::capacity::is_available(&course),
            duration_days: course.duration_days(),
            duration_weeks: course.duration_weeks(),
            duration_months: course.duration_months(),
            total_income: course.total_income(),
            course,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn course(start: (i32, u32, u32), end: (i32, u32, u32)) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "General English".to_string(),
            description: "Speaking and listening".to_string(),
            level: Level::B1,
            price: 150.0,
            teacher_id: None,
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
            max_seats: 10,
            occupied_seats: 4,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn durations_follow_the_calendar() {
        let c = course((2026, 1, 15), (2026, 4, 1));
        assert_eq!(c.duration_days(), 76);
        assert_eq!(c.duration_weeks(), 10);
        assert_eq!(c.duration_months(), 3);
    }

    #[test]
    fn months_span_year_boundaries() {
        let c = course((2025, 11, 1), (2026, 2, 1));
        assert_eq!(c.duration_months(), 3);
    }

    #[test]
    fn income_is_occupied_seats_times_price() {
        let c = course((2026, 1, 1), (2026, 2, 1));
        assert_eq!(c.total_income(), 600.0);
    }

    #[test]
    fn edit_cannot_shrink_below_occupied_seats() {
        let c = course((2026, 1, 1), (2026, 2, 1));
        let edit = UpdateCourse {
            name: None,
            description: None,
            level: None,
            price: None,
            start_date: None,
            end_date: None,
            max_seats: Some(3),
        };
        assert!(edit.validate_against(&c).is_err());
    }

    #[test]
    fn edit_checks_dates_against_existing_values() {
        let c = course((2026, 1, 1), (2026, 2, 1));
        let edit = UpdateCourse {
            name: None,
            description: None,
            level: None,
            price: None,
            start_date: Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            end_date: None,
            max_seats: None,
        };
        assert!(edit.validate_against(&c).is_err());
    }

    #[test]
    fn create_rejects_end_before_start() {
        let input = CreateCourse {
            name: "Grammar".to_string(),
            description: String::new(),
            level: Level::A2,
            price: 90.0,
            start_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            max_seats: Some(5),
        };
        assert!(input.validate().is_err());
    }
}
