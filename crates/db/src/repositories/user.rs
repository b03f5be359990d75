//! User repository.

use std::sync::Arc;

use crate::entities::{
    User,
    user::{self, AccountStatus},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect,
};
use streamgate_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Clear an expired ban, transitioning the account back to active.
    ///
    /// The filter repeats the expiry predicate, so concurrent callers
    /// race harmlessly: the loser matches zero rows. Returns how many
    /// rows were transitioned (0 or 1).
    pub async fn clear_expired_ban(
        &self,
        user_id: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<u64> {
        let result = User::update_many()
            .col_expr(user::Column::Status, Expr::value(AccountStatus::Active))
            .col_expr(user::Column::BanReason, Expr::value(Option::<String>::None))
            .col_expr(
                user::Column::BanExpiresAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::Status.eq(AccountStatus::Banned))
            .filter(user::Column::BanExpiresAt.is_not_null())
            .filter(user::Column::BanExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Clear an expired suspension, transitioning the account back to
    /// active. Same race-safety as [`Self::clear_expired_ban`].
    pub async fn clear_expired_suspension(
        &self,
        user_id: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> AppResult<u64> {
        let result = User::update_many()
            .col_expr(user::Column::Status, Expr::value(AccountStatus::Active))
            .col_expr(
                user::Column::SuspensionReason,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                user::Column::SuspensionExpiresAt,
                Expr::value(Option::<chrono::DateTime<chrono::FixedOffset>>::None),
            )
            .col_expr(user::Column::UpdatedAt, Expr::value(Some(now)))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::Status.eq(AccountStatus::Suspended))
            .filter(user::Column::SuspensionExpiresAt.is_not_null())
            .filter(user::Column::SuspensionExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Users whose stored restriction expiry is due: banned with
    /// `ban_expires_at <= now` or suspended with
    /// `suspension_expires_at <= now`. Range query for the sweep.
    pub async fn find_restriction_expired(
        &self,
        now: chrono::DateTime<chrono::FixedOffset>,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(user::Column::Status.eq(AccountStatus::Banned))
                            .add(user::Column::BanExpiresAt.is_not_null())
                            .add(user::Column::BanExpiresAt.lte(now)),
                    )
                    .add(
                        Condition::all()
                            .add(user::Column::Status.eq(AccountStatus::Suspended))
                            .add(user::Column::SuspensionExpiresAt.is_not_null())
                            .add(user::Column::SuspensionExpiresAt.lte(now)),
                    ),
            )
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn banned_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role: UserRole::Viewer,
            status: AccountStatus::Banned,
            email_verified: true,
            ban_reason: Some("spam".to_string()),
            ban_expires_at: Some((Utc::now() - chrono::Duration::hours(1)).fixed_offset()),
            suspension_reason: None,
            suspension_expires_at: None,
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_missing_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_clear_expired_ban_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let cleared = repo
            .clear_expired_ban("user1", Utc::now().fixed_offset())
            .await
            .unwrap();
        assert_eq!(cleared, 1);
    }

    #[tokio::test]
    async fn test_find_restriction_expired() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[banned_user("user1"), banned_user("user2")]])
                .into_connection(),
        );

        let repo = UserRepository::new(db);
        let due = repo
            .find_restriction_expired(Utc::now().fixed_offset(), 100)
            .await
            .unwrap();
        assert_eq!(due.len(), 2);
    }
}
