//! Mute repository.

use std::sync::Arc;

use crate::entities::{Mute, mute};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use streamgate_common::{AppError, AppResult};

/// Mute repository for database operations.
#[derive(Clone)]
pub struct MuteRepository {
    db: Arc<DatabaseConnection>,
}

impl MuteRepository {
    /// Create a new mute repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new mute.
    pub async fn create(&self, model: mute::ActiveModel) -> AppResult<mute::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Non-expired mutes affecting a user in a stream: rows scoped to
    /// that stream plus global rows (NULL `stream_id`).
    ///
    /// The SQL narrows to candidate rows; `mute::Model::applies` makes
    /// the final call, so both layers share one notion of "active".
    pub async fn find_active(
        &self,
        user_id: &str,
        stream_id: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<Vec<mute::Model>> {
        let rows = Mute::find()
            .filter(mute::Column::UserId.eq(user_id))
            .filter(
                Condition::any()
                    .add(mute::Column::StreamId.is_null())
                    .add(mute::Column::StreamId.eq(stream_id)),
            )
            .filter(mute::Column::ExpiresAt.gt(now))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .filter(|row| row.applies(stream_id, now))
            .collect())
    }

    /// Whether any non-expired mute denies the user chat in a stream.
    pub async fn has_active(
        &self,
        user_id: &str,
        stream_id: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<bool> {
        Ok(!self.find_active(user_id, stream_id, now).await?.is_empty())
    }

    /// Mute history for a user, newest first.
    pub async fn find_for_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<mute::Model>> {
        Mute::find()
            .filter(mute::Column::UserId.eq(user_id))
            .order_by_desc(mute::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete expired mutes (sweep job).
    pub async fn delete_expired(
        &self,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<u64> {
        let result = Mute::delete_many()
            .filter(mute::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn active_mute(id: &str, user_id: &str, stream_id: Option<&str>) -> mute::Model {
        mute::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            stream_id: stream_id.map(ToString::to_string),
            moderator_id: "mod1".to_string(),
            reason: "spam".to_string(),
            expires_at: (Utc::now() + chrono::Duration::minutes(30)).fixed_offset(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[tokio::test]
    async fn test_has_active_with_stream_scoped_mute() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[active_mute("mute1", "user1", Some("s1"))]])
                .into_connection(),
        );

        let repo = MuteRepository::new(db);
        assert!(
            repo.has_active("user1", "s1", Utc::now().fixed_offset())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_mute_stops_blocking_after_expiry() {
        let issued_at = Utc::now().fixed_offset();
        let mut row = active_mute("mute1", "user1", Some("s1"));
        row.expires_at = issued_at + chrono::Duration::minutes(30);

        // During the mute window the user is blocked; once past the
        // expiry the same row no longer counts.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row.clone()], vec![row]])
                .into_connection(),
        );

        let repo = MuteRepository::new(db);
        assert!(
            repo.has_active("user1", "s1", issued_at + chrono::Duration::minutes(29))
                .await
                .unwrap()
        );
        assert!(
            !repo
                .has_active("user1", "s1", issued_at + chrono::Duration::minutes(31))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_has_active_without_mutes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<mute::Model>::new()])
                .into_connection(),
        );

        let repo = MuteRepository::new(db);
        assert!(
            !repo
                .has_active("user1", "s1", Utc::now().fixed_offset())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = MuteRepository::new(db);
        let removed = repo.delete_expired(Utc::now().fixed_offset()).await.unwrap();
        assert_eq!(removed, 3);
    }
}
