#![allow(dead_code)]

use chrono::NaiveDate;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

use lingua_school_backend::db::courses as course_db;
use lingua_school_backend::db::modules as module_db;
use lingua_school_backend::db::users as user_db;
use lingua_school_backend::models::courses::{self, CreateCourse, Level};
use lingua_school_backend::models::modules::{self, AddModules, CreateModule};
use lingua_school_backend::models::users::{self, CreateUserFromAuth, Roles};

/// Fresh in-memory database migrated to the application schema, foreign
/// keys included. A single connection keeps every query on the same
/// in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, role: Roles) -> users::Model {
    let id = Uuid::new_v4();
    user_db::find_or_create_from_auth(
        db,
        CreateUserFromAuth {
            id,
            email: format!("{id}@example.com"),
            display_name: Some("Test User".to_string()),
            role,
        },
    )
    .await
    .expect("Failed to create user")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn course_input(name: &str, max_seats: i32) -> CreateCourse {
    CreateCourse {
        name: name.to_string(),
        description: "Conversation practice and grammar review".to_string(),
        level: Level::B1,
        price: 180.0,
        start_date: date(2026, 1, 12),
        end_date: date(2026, 6, 29),
        max_seats: Some(max_seats),
    }
}

pub async fn create_course(
    db: &DatabaseConnection,
    teacher: &users::Model,
    max_seats: i32,
) -> courses::Model {
    course_db::insert_course(db, course_input("General English", max_seats), teacher.id)
        .await
        .expect("Failed to create course")
}

/// Add `count` modules in sequence (positions 1..=count).
pub async fn add_modules(
    db: &DatabaseConnection,
    course: &courses::Model,
    count: i32,
) -> Vec<modules::Model> {
    let input = AddModules {
        modules: (1..=count)
            .map(|position| CreateModule {
                title: format!("Unit {position}"),
                description: String::new(),
                position,
                duration_hours: None,
            })
            .collect(),
    };
    module_db::insert_modules(db, course.id, input)
        .await
        .expect("Failed to add modules")
}

pub async fn reload_course(db: &DatabaseConnection, id: Uuid) -> courses::Model {
    course_db::get_course_by_id(db, id)
        .await
        .expect("query failed")
        .expect("course exists")
}
