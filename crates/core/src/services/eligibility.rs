//! Chat eligibility: the single allow/deny decision for a user in a
//! stream's chat.
//!
//! Checks run in severity order and short-circuit, so a user under
//! several restrictions at once is always told the most severe one:
//! ban before suspension, suspension before mute, mute before balance.

use chrono::Utc;
use serde::Serialize;
use streamgate_common::AppResult;
use streamgate_db::{
    entities::{stream, user},
    repositories::{MuteRepository, StreamRepository, WalletRepository},
};
use tracing::debug;

use super::restriction::{RestrictionKind, RestrictionService, active_restriction};

/// Stable reason codes for chat denials. Denials are values, not
/// errors: every one of them is something the user can wait out or
/// resolve themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// Account is banned.
    Banned,
    /// Account is suspended.
    Suspended,
    /// Account has an active mute in this stream (or globally).
    Muted,
    /// Viewer wallet balance is not positive.
    InsufficientBalance,
    /// The stream is not in a joinable state.
    StreamNotLive,
}

impl DenialReason {
    /// Wire name of the reason code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Banned => "banned",
            Self::Suspended => "suspended",
            Self::Muted => "muted",
            Self::InsufficientBalance => "insufficient_balance",
            Self::StreamNotLive => "stream_not_live",
        }
    }
}

/// The computed allow/deny decision. Constructible only through
/// [`allowed`](Self::allowed) and [`denied`](Self::denied), so a
/// denial always carries its reason.
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityDecision {
    can_chat: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<DenialReason>,
}

impl EligibilityDecision {
    /// An allow decision.
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            can_chat: true,
            reason: None,
        }
    }

    /// A deny decision with its reason code.
    #[must_use]
    pub const fn denied(reason: DenialReason) -> Self {
        Self {
            can_chat: false,
            reason: Some(reason),
        }
    }

    /// Whether the user may chat.
    #[must_use]
    pub const fn can_chat(&self) -> bool {
        self.can_chat
    }

    /// The reason code when this is a denial, `None` when allowed.
    #[must_use]
    pub const fn denial(&self) -> Option<DenialReason> {
        if self.can_chat { None } else { self.reason }
    }
}

/// Chat eligibility service.
#[derive(Clone)]
pub struct ChatEligibilityService {
    restrictions: RestrictionService,
    streams: StreamRepository,
    wallets: WalletRepository,
    mutes: MuteRepository,
}

impl ChatEligibilityService {
    /// Create a new eligibility service.
    #[must_use]
    pub const fn new(
        restrictions: RestrictionService,
        streams: StreamRepository,
        wallets: WalletRepository,
        mutes: MuteRepository,
    ) -> Self {
        Self {
            restrictions,
            streams,
            wallets,
            mutes,
        }
    }

    /// Decide whether a user may chat in a stream.
    pub async fn check(&self, account_id: &str, stream_id: &str) -> AppResult<EligibilityDecision> {
        let stream = self.streams.get_by_id(stream_id).await?;
        let (_, decision) = self.evaluate(account_id, &stream).await?;
        Ok(decision)
    }

    /// Decide eligibility against an already-fetched stream, returning
    /// the (restriction-refreshed) account alongside the decision.
    pub async fn evaluate(
        &self,
        account_id: &str,
        stream: &stream::Model,
    ) -> AppResult<(user::Model, EligibilityDecision)> {
        let now = Utc::now().fixed_offset();

        // Expired restrictions are cleared before the decision is
        // computed, so a just-expired ban never wrongly denies.
        let account = self.restrictions.refresh_by_id(account_id, now).await?;

        if let Some(restriction) = active_restriction(&account, now) {
            let reason = match restriction.kind {
                RestrictionKind::Ban => DenialReason::Banned,
                RestrictionKind::Suspension => DenialReason::Suspended,
            };
            debug!(account_id, stream_id = %stream.id, reason = reason.code(), "Chat denied");
            return Ok((account, EligibilityDecision::denied(reason)));
        }

        if self.mutes.has_active(account_id, &stream.id, now).await? {
            debug!(account_id, stream_id = %stream.id, "Chat denied: muted");
            return Ok((account, EligibilityDecision::denied(DenialReason::Muted)));
        }

        // Viewers pay per unit of engagement; the stream's creator and
        // platform staff are exempt from the balance gate.
        let exempt = account.id == stream.creator_id || account.role.is_staff();
        if !exempt && self.wallets.balance_of(account_id).await? <= 0 {
            debug!(account_id, stream_id = %stream.id, "Chat denied: insufficient balance");
            return Ok((
                account,
                EligibilityDecision::denied(DenialReason::InsufficientBalance),
            ));
        }

        Ok((account, EligibilityDecision::allowed()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use streamgate_db::entities::user::{AccountStatus, UserRole};
    use streamgate_db::entities::{mute, stream::StreamStatus, wallet};
    use streamgate_db::repositories::UserRepository;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ChatEligibilityService {
        let users = UserRepository::new(db.clone());
        let mutes = MuteRepository::new(db.clone());
        ChatEligibilityService::new(
            RestrictionService::new(users, mutes.clone()),
            StreamRepository::new(db.clone()),
            WalletRepository::new(db),
            mutes,
        )
    }

    fn viewer(id: &str, status: AccountStatus) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role: UserRole::Viewer,
            status,
            email_verified: true,
            ban_reason: None,
            ban_expires_at: None,
            suspension_reason: None,
            suspension_expires_at: None,
            created_at: Utc::now().fixed_offset(),
            updated_at: None,
        }
    }

    fn live_stream(id: &str, creator_id: &str) -> stream::Model {
        stream::Model {
            id: id.to_string(),
            creator_id: creator_id.to_string(),
            title: "Test".to_string(),
            status: StreamStatus::Live,
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn wallet_row(user_id: &str, balance: i64) -> wallet::Model {
        wallet::Model {
            id: format!("wallet-{user_id}"),
            user_id: user_id.to_string(),
            balance,
            currency: "credits".to_string(),
            updated_at: None,
        }
    }

    fn active_mute(user_id: &str, stream_id: &str) -> mute::Model {
        mute::Model {
            id: "mute1".to_string(),
            user_id: user_id.to_string(),
            stream_id: Some(stream_id.to_string()),
            moderator_id: "mod1".to_string(),
            reason: "spam".to_string(),
            expires_at: (Utc::now() + chrono::Duration::minutes(10)).fixed_offset(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn a_denial_always_carries_its_reason() {
        assert_eq!(EligibilityDecision::allowed().denial(), None);

        let denied = EligibilityDecision::denied(DenialReason::Muted);
        assert!(!denied.can_chat());
        assert_eq!(denied.denial(), Some(DenialReason::Muted));
    }

    #[tokio::test]
    async fn banned_user_is_reported_banned_before_mute_is_even_queried() {
        let mut banned = viewer("user1", AccountStatus::Banned);
        banned.ban_reason = Some("abuse".to_string());
        // Permanent ban: no expiry

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[banned]])
                .into_connection(),
        );

        let decision = service(db).check("user1", "s1").await.unwrap();
        assert!(!decision.can_chat());
        assert_eq!(decision.denial(), Some(DenialReason::Banned));
    }

    #[tokio::test]
    async fn muted_user_is_denied_with_mute_reason() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[viewer("user1", AccountStatus::Active)]])
                .append_query_results([[active_mute("user1", "s1")]])
                .into_connection(),
        );

        let decision = service(db).check("user1", "s1").await.unwrap();
        assert_eq!(decision.denial(), Some(DenialReason::Muted));
    }

    #[tokio::test]
    async fn zero_balance_viewer_is_denied() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[viewer("user1", AccountStatus::Active)]])
                .append_query_results([Vec::<mute::Model>::new()])
                .append_query_results([[wallet_row("user1", 0)]])
                .into_connection(),
        );

        let decision = service(db).check("user1", "s1").await.unwrap();
        assert_eq!(decision.denial(), Some(DenialReason::InsufficientBalance));
    }

    #[tokio::test]
    async fn creator_with_zero_balance_can_chat_on_own_stream() {
        let mut creator = viewer("creator1", AccountStatus::Active);
        creator.role = UserRole::Creator;

        // No wallet query is appended: the balance gate must not run.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[creator]])
                .append_query_results([Vec::<mute::Model>::new()])
                .into_connection(),
        );

        let decision = service(db).check("creator1", "s1").await.unwrap();
        assert!(decision.can_chat());
        assert_eq!(decision.denial(), None);
    }

    #[tokio::test]
    async fn expired_ban_is_cleared_before_the_decision() {
        let mut was_banned = viewer("user1", AccountStatus::Banned);
        was_banned.ban_reason = Some("spam".to_string());
        was_banned.ban_expires_at = Some((Utc::now() - chrono::Duration::hours(1)).fixed_offset());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[was_banned]])
                .append_query_results([Vec::<mute::Model>::new()])
                .append_query_results([[wallet_row("user1", 5)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let decision = service(db).check("user1", "s1").await.unwrap();
        assert!(decision.can_chat());
    }

    #[tokio::test]
    async fn credited_wallet_flips_the_decision() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[live_stream("s1", "creator1")]])
                .append_query_results([[viewer("user1", AccountStatus::Active)]])
                .append_query_results([Vec::<mute::Model>::new()])
                .append_query_results([[wallet_row("user1", 5)]])
                .into_connection(),
        );

        let decision = service(db).check("user1", "s1").await.unwrap();
        assert!(decision.can_chat());
        assert_eq!(decision.denial(), None);
    }
}
