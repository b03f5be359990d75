//! Create moderation action table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ModerationAction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModerationAction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ModerationAction::ActorId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModerationAction::TargetType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModerationAction::TargetId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ModerationAction::Action)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ModerationAction::Reason).text())
                    .col(ColumnDef::new(ModerationAction::DurationSecs).big_integer())
                    .col(
                        ColumnDef::new(ModerationAction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (target_type, target_id) - audit trail lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_moderation_action_target")
                    .table(ModerationAction::Table)
                    .col(ModerationAction::TargetType)
                    .col(ModerationAction::TargetId)
                    .to_owned(),
            )
            .await?;

        // Index: actor_id
        manager
            .create_index(
                Index::create()
                    .name("idx_moderation_action_actor")
                    .table(ModerationAction::Table)
                    .col(ModerationAction::ActorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ModerationAction::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ModerationAction {
    Table,
    Id,
    ActorId,
    TargetType,
    TargetId,
    Action,
    Reason,
    DurationSecs,
    CreatedAt,
}
