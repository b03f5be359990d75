//! Restriction clock: decides whether a stored ban or suspension is
//! currently active and clears it once its expiry has passed.
//!
//! The same clearing predicate backs both the inline check (login,
//! eligibility) and the periodic sweep, so the two paths can never
//! disagree about whether a restriction is active. Clearing is a
//! conditional update keyed on the expiry still being due, which makes
//! concurrent callers race harmlessly.

use chrono::{DateTime, FixedOffset};
use streamgate_common::AppResult;
use streamgate_db::{
    entities::user::{self, AccountStatus},
    repositories::{MuteRepository, UserRepository},
};
use tracing::{debug, info};

/// Batch size for the expiry sweep.
const SWEEP_BATCH: u64 = 500;

/// Kind of account-level restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionKind {
    /// Account is banned.
    Ban,
    /// Account is suspended.
    Suspension,
}

/// A currently-active restriction on an account.
#[derive(Debug, Clone)]
pub struct ActiveRestriction {
    /// What kind of restriction applies.
    pub kind: RestrictionKind,
    /// Stored reason, if any.
    pub reason: Option<String>,
    /// True when the restriction has no expiry.
    pub permanent: bool,
    /// Human-readable remaining duration ("2 hours"), None if permanent.
    pub remaining: Option<String>,
}

/// Evaluate the stored restriction fields against `now`.
///
/// Pure: expired restrictions evaluate as inactive even before any
/// caller has cleared them, so a just-expired ban never wrongly denies.
#[must_use]
pub fn active_restriction(
    account: &user::Model,
    now: DateTime<FixedOffset>,
) -> Option<ActiveRestriction> {
    let (kind, reason, expires_at) = match account.status {
        AccountStatus::Active => return None,
        AccountStatus::Banned => (
            RestrictionKind::Ban,
            account.ban_reason.clone(),
            account.ban_expires_at,
        ),
        AccountStatus::Suspended => (
            RestrictionKind::Suspension,
            account.suspension_reason.clone(),
            account.suspension_expires_at,
        ),
    };

    match expires_at {
        Some(expiry) if expiry <= now => None,
        Some(expiry) => Some(ActiveRestriction {
            kind,
            reason,
            permanent: false,
            remaining: Some(format_remaining(expiry - now)),
        }),
        None => Some(ActiveRestriction {
            kind,
            reason,
            permanent: true,
            remaining: None,
        }),
    }
}

/// Format a remaining duration for user-facing denial messages.
#[must_use]
pub fn format_remaining(duration: chrono::Duration) -> String {
    let minutes = duration.num_minutes().max(1);
    if minutes < 60 {
        return format!("{minutes} minute{}", plural(minutes));
    }
    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours} hour{}", plural(hours));
    }
    let days = duration.num_days();
    format!("{days} day{}", plural(days))
}

const fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Outcome of an expired-restriction sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Bans cleared.
    pub unbanned: u64,
    /// Suspensions cleared.
    pub unsuspended: u64,
    /// Expired mute rows removed.
    pub expired_mutes_removed: u64,
}

/// Restriction service: shared clearing logic for the inline check and
/// the periodic sweep.
#[derive(Clone)]
pub struct RestrictionService {
    users: UserRepository,
    mutes: MuteRepository,
}

impl RestrictionService {
    /// Create a new restriction service.
    #[must_use]
    pub const fn new(users: UserRepository, mutes: MuteRepository) -> Self {
        Self { users, mutes }
    }

    /// Clear an expired restriction on the account, if any, and return
    /// the account as it now stands.
    ///
    /// Idempotent: when another caller already cleared the restriction
    /// the conditional update matches zero rows and the result is the
    /// same cleared account.
    pub async fn refresh(
        &self,
        mut account: user::Model,
        now: DateTime<FixedOffset>,
    ) -> AppResult<user::Model> {
        match account.status {
            AccountStatus::Banned => {
                if account.ban_expires_at.is_some_and(|expiry| expiry <= now) {
                    let cleared = self.users.clear_expired_ban(&account.id, now).await?;
                    debug!(user_id = %account.id, cleared, "Expired ban cleared");
                    account.status = AccountStatus::Active;
                    account.ban_reason = None;
                    account.ban_expires_at = None;
                }
            }
            AccountStatus::Suspended => {
                if account
                    .suspension_expires_at
                    .is_some_and(|expiry| expiry <= now)
                {
                    let cleared = self.users.clear_expired_suspension(&account.id, now).await?;
                    debug!(user_id = %account.id, cleared, "Expired suspension cleared");
                    account.status = AccountStatus::Active;
                    account.suspension_reason = None;
                    account.suspension_expires_at = None;
                }
            }
            AccountStatus::Active => {}
        }

        Ok(account)
    }

    /// Fetch an account by ID and clear any expired restriction.
    pub async fn refresh_by_id(
        &self,
        user_id: &str,
        now: DateTime<FixedOffset>,
    ) -> AppResult<user::Model> {
        let account = self.users.get_by_id(user_id).await?;
        self.refresh(account, now).await
    }

    /// Sweep all accounts whose restriction expiry is due, clearing
    /// each through the same predicate the inline check uses, and
    /// remove expired mute rows.
    pub async fn sweep_expired(&self, now: DateTime<FixedOffset>) -> AppResult<SweepOutcome> {
        let mut outcome = SweepOutcome::default();

        loop {
            let due = self.users.find_restriction_expired(now, SWEEP_BATCH).await?;
            if due.is_empty() {
                break;
            }
            let batch_len = due.len() as u64;

            for account in due {
                match account.status {
                    AccountStatus::Banned => {
                        outcome.unbanned += self.users.clear_expired_ban(&account.id, now).await?;
                    }
                    AccountStatus::Suspended => {
                        outcome.unsuspended +=
                            self.users.clear_expired_suspension(&account.id, now).await?;
                    }
                    AccountStatus::Active => {}
                }
            }

            if batch_len < SWEEP_BATCH {
                break;
            }
        }

        outcome.expired_mutes_removed = self.mutes.delete_expired(now).await?;

        info!(
            unbanned = outcome.unbanned,
            unsuspended = outcome.unsuspended,
            expired_mutes = outcome.expired_mutes_removed,
            "Restriction sweep completed"
        );

        Ok(outcome)
    }
}
