use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_users_table::Users;
use super::m20261001_000002_create_courses_table::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub enum CourseOrders {
    Table,
    Id,
    CourseId,
    StudentId,
    Status,
    Progress,
    PricePaid,
    Notes,
    StartDate,
    ExpectedEndDate,
    ActualEndDate,
    Rating,
    Feedback,
    CancellationReason,
    OrderDate,
    LastActivity,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseOrders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseOrders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CourseOrders::CourseId).uuid().not_null())
                    .col(ColumnDef::new(CourseOrders::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(CourseOrders::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(CourseOrders::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CourseOrders::PricePaid).double().not_null())
                    .col(ColumnDef::new(CourseOrders::Notes).text().not_null())
                    .col(ColumnDef::new(CourseOrders::StartDate).date().not_null())
                    .col(ColumnDef::new(CourseOrders::ExpectedEndDate).date().not_null())
                    .col(ColumnDef::new(CourseOrders::ActualEndDate).date().null())
                    .col(ColumnDef::new(CourseOrders::Rating).integer().null())
                    .col(ColumnDef::new(CourseOrders::Feedback).text().not_null())
                    .col(
                        ColumnDef::new(CourseOrders::CancellationReason)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseOrders::OrderDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CourseOrders::LastActivity)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_orders_course_id")
                            .from(CourseOrders::Table, CourseOrders::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_orders_student_id")
                            .from(CourseOrders::Table, CourseOrders::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One order per (course, student); the ledger relies on it to turn a
        // racing duplicate enrollment into "already enrolled".
        manager
            .create_index(
                Index::create()
                    .name("idx_course_orders_course_student_unique")
                    .table(CourseOrders::Table)
                    .col(CourseOrders::CourseId)
                    .col(CourseOrders::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CourseOrders::Table).to_owned())
            .await
    }
}
