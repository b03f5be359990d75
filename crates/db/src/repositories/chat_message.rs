//! Chat message repository.

use std::sync::Arc;

use crate::entities::{ChatMessage, chat_message};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use streamgate_common::{AppError, AppResult};

/// Chat message repository for database operations.
#[derive(Clone)]
pub struct ChatMessageRepository {
    db: Arc<DatabaseConnection>,
}

impl ChatMessageRepository {
    /// Create a new chat message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persist a new chat message.
    pub async fn create(&self, model: chat_message::ActiveModel) -> AppResult<chat_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a message by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<chat_message::Model>> {
        ChatMessage::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a message by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<chat_message::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::MessageNotFound(id.to_string()))
    }

    /// Recent messages in a stream, newest first. Soft-deleted rows
    /// are excluded unless `include_deleted` is set (moderation view).
    pub async fn find_by_stream(
        &self,
        stream_id: &str,
        limit: u64,
        include_deleted: bool,
    ) -> AppResult<Vec<chat_message::Model>> {
        let mut query = ChatMessage::find()
            .filter(chat_message::Column::StreamId.eq(stream_id))
            .order_by_desc(chat_message::Column::CreatedAt);

        if !include_deleted {
            query = query.filter(chat_message::Column::IsDeleted.eq(false));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn message(id: &str, stream_id: &str, deleted: bool) -> chat_message::Model {
        chat_message::Model {
            id: id.to_string(),
            stream_id: stream_id.to_string(),
            user_id: "user1".to_string(),
            text: "hello".to_string(),
            is_deleted: deleted,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_message() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<chat_message::Model>::new()])
                .into_connection(),
        );

        let repo = ChatMessageRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AppError::MessageNotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_stream() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[message("m1", "s1", false), message("m2", "s1", false)]])
                .into_connection(),
        );

        let repo = ChatMessageRepository::new(db);
        let messages = repo.find_by_stream("s1", 50, false).await.unwrap();
        assert_eq!(messages.len(), 2);
    }
}
