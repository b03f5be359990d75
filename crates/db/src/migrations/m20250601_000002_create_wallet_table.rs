//! Create wallet table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallet::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallet::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Wallet::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Wallet::Currency)
                            .string_len(16)
                            .not_null()
                            .default("credits"),
                    )
                    .col(ColumnDef::new(Wallet::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_wallet_user")
                            .from(Wallet::Table, Wallet::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: user_id (one wallet per user)
        manager
            .create_index(
                Index::create()
                    .name("idx_wallet_user_id")
                    .table(Wallet::Table)
                    .col(Wallet::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Wallet::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Wallet {
    Table,
    Id,
    UserId,
    Balance,
    Currency,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
