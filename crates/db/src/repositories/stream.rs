//! Stream repository.

use std::sync::Arc;

use crate::entities::{Stream, stream};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use streamgate_common::{AppError, AppResult};

/// Stream repository for database operations.
#[derive(Clone)]
pub struct StreamRepository {
    db: Arc<DatabaseConnection>,
}

impl StreamRepository {
    /// Create a new stream repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a stream by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<stream::Model>> {
        Stream::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a stream by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<stream::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::StreamNotFound(id.to_string()))
    }

    /// Streams created by a user, newest first.
    pub async fn find_by_creator(
        &self,
        creator_id: &str,
        limit: u64,
    ) -> AppResult<Vec<stream::Model>> {
        Stream::find()
            .filter(stream::Column::CreatorId.eq(creator_id))
            .order_by_desc(stream::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
