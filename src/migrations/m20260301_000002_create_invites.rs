//! Migration: Create invites table
//!
//! One row per invited address, carrying three independent campaign
//! lifecycles (original invite, launch, conversion).

use sea_orm_migration::prelude::*;

use super::m20260301_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Invites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Invites::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Invites::InviteToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Invites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Original invite campaign
                    .col(
                        ColumnDef::new(Invites::SentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::EmailId).string().null())
                    .col(
                        ColumnDef::new(Invites::DeliveredAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::OpenedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::ClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::BouncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::BounceType).string().null())
                    .col(
                        ColumnDef::new(Invites::ClaimedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(Invites::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::LastSendAttemptAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::SendCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Launch campaign
                    .col(
                        ColumnDef::new(Invites::LaunchEmailSentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::LaunchEmailId).string().null())
                    .col(
                        ColumnDef::new(Invites::LaunchEmailOpenedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::LaunchEmailClickedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Invites::LaunchLastSendAttemptAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Conversion campaign
                    .col(
                        ColumnDef::new(Invites::ConversionEmailSentAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Invites::ConversionEmailId).string().null())
                    .col(
                        ColumnDef::new(Invites::ConversionLastSendAttemptAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Invites::Table, Invites::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invites_token")
                    .table(Invites::Table)
                    .col(Invites::InviteToken)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invites_email")
                    .table(Invites::Table)
                    .col(Invites::Email)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Invites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Invites {
    Table,
    Id,
    Email,
    InviteToken,
    CreatedAt,
    SentAt,
    EmailId,
    DeliveredAt,
    OpenedAt,
    ClickedAt,
    BouncedAt,
    BounceType,
    ClaimedAt,
    UserId,
    ExpiresAt,
    LastSendAttemptAt,
    SendCount,
    LaunchEmailSentAt,
    LaunchEmailId,
    LaunchEmailOpenedAt,
    LaunchEmailClickedAt,
    LaunchLastSendAttemptAt,
    ConversionEmailSentAt,
    ConversionEmailId,
    ConversionLastSendAttemptAt,
}
