use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_courses_table::Courses;
use super::m20261001_000003_create_course_modules_table::CourseModules;
use super::m20261001_000004_create_course_orders_table::CourseOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Student's "my courses" list
        manager
            .create_index(
                Index::create()
                    .name("idx_course_orders_student_id")
                    .table(CourseOrders::Table)
                    .col(CourseOrders::StudentId)
                    .to_owned(),
            )
            .await?;

        // Seat recount filters by course and status
        manager
            .create_index(
                Index::create()
                    .name("idx_course_orders_course_status")
                    .table(CourseOrders::Table)
                    .col(CourseOrders::CourseId)
                    .col(CourseOrders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_modules_course_position")
                    .table(CourseModules::Table)
                    .col(CourseModules::CourseId)
                    .col(CourseModules::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_teacher_id")
                    .table(Courses::Table)
                    .col(Courses::TeacherId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_start_date")
                    .table(Courses::Table)
                    .col(Courses::StartDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_orders_student_id")
                    .table(CourseOrders::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_orders_course_status")
                    .table(CourseOrders::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_course_modules_course_position")
                    .table(CourseModules::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_courses_teacher_id")
                    .table(Courses::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_courses_start_date")
                    .table(Courses::Table)
                    .to_owned(),
            )
            .await
    }
}
