use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `course_modules` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_modules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Display and completion sequence. Not unique.
    pub position: i32,
    pub duration_hours: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::order_modules::Entity")]
    Completions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::order_modules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Completions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateModule {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub position: i32,
    pub duration_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddModules {
    pub modules: Vec<CreateModule>,
}

impl AddModules {
    pub fn validate(&self) -> Result<(), String> {
        if self.modules.is_empty() {
            return Err("Add at least one module".to_string());
        }
        for module in &self.modules {
            if module.title.trim().is_empty() {
                return Err("Every module needs a title".to_string());
            }
            if module.duration_hours.is_some_and(|h| h < 1) {
                return Err(format!(
                    "Module \"{}\" must last at least one hour",
                    module.title
                ));
            }
        }
        Ok(())
    }
}

/// A module annotated with whether the viewing student has completed it.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleProgress {
    #[serde(flatten)]
    pub module: Model,
    pub completed: bool,
}
