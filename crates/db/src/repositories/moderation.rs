//! Moderation repository.
//!
//! Moderation writes pair a state mutation with its append-only audit
//! row. The pair commits in one transaction: either both land or the
//! whole action fails.

use std::sync::Arc;

use crate::entities::{
    ModerationAction, chat_message, moderation_action, mute, user,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use streamgate_common::{AppError, AppResult};

/// Moderation repository for database operations.
#[derive(Clone)]
pub struct ModerationRepository {
    db: Arc<DatabaseConnection>,
}

impl ModerationRepository {
    /// Create a new moderation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a mute and its audit record atomically.
    pub async fn mute_with_audit(
        &self,
        mute: mute::ActiveModel,
        audit: moderation_action::ActiveModel,
    ) -> AppResult<(mute::Model, moderation_action::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mute = mute
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let audit = audit
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((mute, audit))
    }

    /// Apply a ban (user status update) and its audit record atomically.
    pub async fn ban_with_audit(
        &self,
        user: user::ActiveModel,
        audit: moderation_action::ActiveModel,
    ) -> AppResult<(user::Model, moderation_action::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = user
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let audit = audit
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((user, audit))
    }

    /// Soft-delete a chat message and write its audit record atomically.
    pub async fn delete_message_with_audit(
        &self,
        message: chat_message::ActiveModel,
        audit: moderation_action::ActiveModel,
    ) -> AppResult<(chat_message::Model, moderation_action::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let message = message
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let audit = audit
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((message, audit))
    }

    /// Record an audit-only action (warn).
    pub async fn record_audit(
        &self,
        audit: moderation_action::ActiveModel,
    ) -> AppResult<moderation_action::Model> {
        audit
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Audit trail for a target, newest first.
    pub async fn actions_for_target(
        &self,
        target_type: moderation_action::TargetType,
        target_id: &str,
        limit: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        ModerationAction::find()
            .filter(moderation_action::Column::TargetType.eq(target_type))
            .filter(moderation_action::Column::TargetId.eq(target_id))
            .order_by_desc(moderation_action::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Recent audit records across the whole platform.
    pub async fn recent_actions(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        ModerationAction::find()
            .order_by_desc(moderation_action::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
