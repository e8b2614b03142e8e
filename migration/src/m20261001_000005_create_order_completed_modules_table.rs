use sea_orm_migration::prelude::*;

use super::m20261001_000003_create_course_modules_table::CourseModules;
use super::m20261001_000004_create_course_orders_table::CourseOrders;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Completed-module set of each order.
#[derive(DeriveIden)]
enum OrderCompletedModules {
    Table,
    OrderId,
    ModuleId,
    CompletedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OrderCompletedModules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OrderCompletedModules::OrderId).uuid().not_null())
                    .col(ColumnDef::new(OrderCompletedModules::ModuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(OrderCompletedModules::CompletedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(OrderCompletedModules::OrderId)
                            .col(OrderCompletedModules::ModuleId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_completed_modules_order_id")
                            .from(OrderCompletedModules::Table, OrderCompletedModules::OrderId)
                            .to(CourseOrders::Table, CourseOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_completed_modules_module_id")
                            .from(OrderCompletedModules::Table, OrderCompletedModules::ModuleId)
                            .to(CourseModules::Table, CourseModules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderCompletedModules::Table).to_owned())
            .await
    }
}
