pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users_table;
mod m20261001_000002_create_courses_table;
mod m20261001_000003_create_course_modules_table;
mod m20261001_000004_create_course_orders_table;
mod m20261001_000005_create_order_completed_modules_table;
mod m20261001_000006_create_feedback_table;
mod m20261001_000007_add_indexes;
mod m20261001_000008_create_feedback_likes_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users_table::Migration),
            Box::new(m20261001_000002_create_courses_table::Migration),
            Box::new(m20261001_000003_create_course_modules_table::Migration),
            Box::new(m20261001_000004_create_course_orders_table::Migration),
            Box::new(m20261001_000005_create_order_completed_modules_table::Migration),
            Box::new(m20261001_000006_create_feedback_table::Migration),
            Box::new(m20261001_000007_add_indexes::Migration),
            Box::new(m20261001_000008_create_feedback_likes_table::Migration),
        ]
    }
}
