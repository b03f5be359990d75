//! Create stream table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stream::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stream::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stream::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Stream::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Stream::Status)
                            .string_len(32)
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(Stream::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stream_creator")
                            .from(Stream::Table, Stream::CreatorId)
                            .to(User::Table, User::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: creator_id (for listing a creator's streams)
        manager
            .create_index(
                Index::create()
                    .name("idx_stream_creator_id")
                    .table(Stream::Table)
                    .col(Stream::CreatorId)
                    .to_owned(),
            )
            .await?;

        // Index: status (for listing live streams)
        manager
            .create_index(
                Index::create()
                    .name("idx_stream_status")
                    .table(Stream::Table)
                    .col(Stream::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Stream::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Stream {
    Table,
    Id,
    CreatorId,
    Title,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
