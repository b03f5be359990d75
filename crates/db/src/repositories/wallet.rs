//! Wallet repository.
//!
//! The chat engine only reads balances; settlement writes happen in
//! the billing pipeline.

use std::sync::Arc;

use crate::entities::{Wallet, wallet};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use streamgate_common::{AppError, AppResult};

/// Wallet repository for database operations.
#[derive(Clone)]
pub struct WalletRepository {
    db: Arc<DatabaseConnection>,
}

impl WalletRepository {
    /// Create a new wallet repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a wallet by its owning user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<wallet::Model>> {
        Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Current balance for a user. A missing wallet row reads as zero.
    pub async fn balance_of(&self, user_id: &str) -> AppResult<i64> {
        Ok(self
            .find_by_user_id(user_id)
            .await?
            .map_or(0, |w| w.balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn wallet_row(user_id: &str, balance: i64) -> wallet::Model {
        wallet::Model {
            id: format!("wallet-{user_id}"),
            user_id: user_id.to_string(),
            balance,
            currency: "credits".to_string(),
            updated_at: Some(Utc::now().fixed_offset()),
        }
    }

    #[tokio::test]
    async fn test_balance_of() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[wallet_row("user1", 42)]])
                .into_connection(),
        );

        let repo = WalletRepository::new(db);
        assert_eq!(repo.balance_of("user1").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_missing_wallet_reads_as_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<wallet::Model>::new()])
                .into_connection(),
        );

        let repo = WalletRepository::new(db);
        assert_eq!(repo.balance_of("user1").await.unwrap(), 0);
    }
}
