use sea_orm_migration::prelude::*;

use super::m20261001_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
pub enum Feedback {
    Table,
    Id,
    UserId,
    Name,
    Email,
    Phone,
    FeedbackType,
    Subject,
    Message,
    SiteDesignRating,
    UsabilityRating,
    ContentRating,
    SpeedRating,
    WouldRecommend,
    OverallSatisfaction,
    MostLiked,
    Improvements,
    Suggestions,
    AdditionalComments,
    AverageRating,
    TotalScore,
    MaxPossibleScore,
    SentimentScore,
    IsProcessed,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let rating = |col: Feedback| {
            ColumnDef::new(col)
                .integer()
                .not_null()
                .default(0)
                .to_owned()
        };

        manager
            .create_table(
                Table::create()
                    .table(Feedback::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Feedback::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Feedback::UserId).uuid().null())
                    .col(ColumnDef::new(Feedback::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Feedback::Email).string().not_null())
                    .col(ColumnDef::new(Feedback::Phone).string_len(30).not_null())
                    .col(
                        ColumnDef::new(Feedback::FeedbackType)
                            .string_len(20)
                            .not_null()
                            .default("general"),
                    )
                    .col(ColumnDef::new(Feedback::Subject).string_len(200).not_null())
                    .col(ColumnDef::new(Feedback::Message).text().not_null())
                    .col(rating(Feedback::SiteDesignRating))
                    .col(rating(Feedback::UsabilityRating))
                    .col(rating(Feedback::ContentRating))
                    .col(rating(Feedback::SpeedRating))
                    .col(ColumnDef::new(Feedback::WouldRecommend).string_len(20).null())
                    .col(
                        ColumnDef::new(Feedback::OverallSatisfaction)
                            .string_len(20)
                            .null(),
                    )
                    .col(ColumnDef::new(Feedback::MostLiked).text().not_null())
                    .col(ColumnDef::new(Feedback::Improvements).text().not_null())
                    .col(ColumnDef::new(Feedback::Suggestions).text().not_null())
                    .col(ColumnDef::new(Feedback::AdditionalComments).text().not_null())
                    .col(ColumnDef::new(Feedback::AverageRating).double().not_null())
                    .col(ColumnDef::new(Feedback::TotalScore).integer().not_null())
                    .col(ColumnDef::new(Feedback::MaxPossibleScore).integer().not_null())
                    .col(ColumnDef::new(Feedback::SentimentScore).double().not_null())
                    .col(
                        ColumnDef::new(Feedback::IsProcessed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Feedback::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedback_user_id")
                            .from(Feedback::Table, Feedback::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Table).to_owned())
            .await
    }
}
