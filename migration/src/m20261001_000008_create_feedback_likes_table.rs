use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_users_table::Users;
use super::m20261001_000006_create_feedback_table::Feedback;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum FeedbackLikes {
    Table,
    Id,
    FeedbackId,
    UserId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedbackLikes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbackLikes::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedbackLikes::FeedbackId).uuid().not_null())
                    .col(ColumnDef::new(FeedbackLikes::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(FeedbackLikes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_likes_feedback_id")
                            .from(FeedbackLikes::Table, FeedbackLikes::FeedbackId)
                            .to(Feedback::Table, Feedback::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_likes_user_id")
                            .from(FeedbackLikes::Table, FeedbackLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A user likes a given answer at most once
        manager
            .create_index(
                Index::create()
                    .name("idx_feedback_likes_feedback_user_unique")
                    .table(FeedbackLikes::Table)
                    .col(FeedbackLikes::FeedbackId)
                    .col(FeedbackLikes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbackLikes::Table).to_owned())
            .await
    }
}
