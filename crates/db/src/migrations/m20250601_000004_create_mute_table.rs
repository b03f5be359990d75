//! Create mute table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Mute::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mute::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mute::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Mute::StreamId).string_len(32))
                    .col(ColumnDef::new(Mute::ModeratorId).string_len(32).not_null())
                    .col(ColumnDef::new(Mute::Reason).text().not_null())
                    // Mutes are always temporary
                    .col(
                        ColumnDef::new(Mute::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Mute::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mute_user")
                            .from(Mute::Table, Mute::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mute_stream")
                            .from(Mute::Table, Mute::StreamId)
                            .to(Stream::Table, Stream::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, stream_id) - eligibility lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_mute_user_stream")
                    .table(Mute::Table)
                    .col(Mute::UserId)
                    .col(Mute::StreamId)
                    .to_owned(),
            )
            .await?;

        // Index: expires_at (for cleanup job)
        manager
            .create_index(
                Index::create()
                    .name("idx_mute_expires_at")
                    .table(Mute::Table)
                    .col(Mute::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Mute::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Mute {
    Table,
    Id,
    UserId,
    StreamId,
    ModeratorId,
    Reason,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Stream {
    Table,
    Id,
}
