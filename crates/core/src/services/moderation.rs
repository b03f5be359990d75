//! Moderation action processor.
//!
//! Validates the actor and the target, then applies the action and its
//! audit record in one transaction. Validation happens before any
//! write: an unknown action, an unauthorized actor, or a missing
//! target mutates nothing.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::Set;
use streamgate_common::{AppError, AppResult, IdGenerator, config::ModerationConfig};
use streamgate_db::{
    entities::{
        chat_message, moderation_action, mute, stream,
        user::{self, AccountStatus, UserRole},
    },
    repositories::{
        ChatMessageRepository, ModerationRepository, StreamRepository, UserRepository,
    },
};
use tracing::info;

pub use streamgate_db::entities::moderation_action::{ActionKind, TargetType};

/// What a moderation action is aimed at.
#[derive(Debug, Clone)]
pub enum ModerationTarget {
    /// A user, optionally scoped to a stream (mute scope and creator
    /// authorization derive from it).
    User {
        /// Target account.
        user_id: String,
        /// Stream context, None for platform-wide actions.
        stream_id: Option<String>,
    },
    /// A chat message.
    Message {
        /// Target message.
        message_id: String,
    },
}

/// Input for applying a moderation action.
#[derive(Debug, Clone)]
pub struct ModerationInput {
    /// The action to apply.
    pub action: ActionKind,
    /// What it targets.
    pub target: ModerationTarget,
    /// Reason shown to the target and stored in the audit log.
    pub reason: Option<String>,
    /// Restriction duration in seconds. Mutes fall back to the
    /// configured default; bans without a duration are permanent.
    pub duration_secs: Option<i64>,
}

/// Result of a successfully applied action.
#[derive(Debug, Clone)]
pub struct ModerationOutcome {
    /// ID of the audit record every action writes.
    pub audit_id: String,
    /// The applied action.
    pub action: ActionKind,
}

/// Moderation service.
#[derive(Clone)]
pub struct ModerationService {
    users: UserRepository,
    streams: StreamRepository,
    messages: ChatMessageRepository,
    moderation: ModerationRepository,
    default_mute_minutes: i64,
    id_gen: IdGenerator,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(
        users: UserRepository,
        streams: StreamRepository,
        messages: ChatMessageRepository,
        moderation: ModerationRepository,
        config: &ModerationConfig,
    ) -> Self {
        Self {
            users,
            streams,
            messages,
            moderation,
            default_mute_minutes: config.default_mute_minutes,
            id_gen: IdGenerator::new(),
        }
    }

    /// Parse a wire-format action kind, rejecting unknown kinds before
    /// anything is written.
    pub fn parse_action(kind: &str) -> AppResult<ActionKind> {
        kind.parse().map_err(AppError::Validation)
    }

    /// Apply a moderation action on behalf of an actor.
    pub async fn apply(
        &self,
        actor_id: &str,
        input: ModerationInput,
    ) -> AppResult<ModerationOutcome> {
        let now = Utc::now().fixed_offset();

        let duration_secs = validated_duration(input.duration_secs)?;

        // Fail closed: an actor we cannot resolve moderates nothing.
        let actor = self
            .users
            .find_by_id(actor_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Moderation actor could not be resolved".to_string())
            })?;

        match input.target {
            ModerationTarget::User { user_id, stream_id } => {
                let stream = match stream_id {
                    Some(id) => Some(self.streams.get_by_id(&id).await?),
                    None => None,
                };
                authorize(&actor, stream.as_ref())?;
                self.apply_to_user(
                    &actor,
                    &user_id,
                    stream.as_ref(),
                    input.action,
                    input.reason,
                    duration_secs,
                    now,
                )
                .await
            }
            ModerationTarget::Message { message_id } => {
                let message = self.messages.get_by_id(&message_id).await?;
                let stream = self.streams.get_by_id(&message.stream_id).await?;
                authorize(&actor, Some(&stream))?;
                self.apply_to_message(&actor, message, input.action, input.reason, now)
                    .await
            }
        }
    }

    /// Audit trail for a target, newest first.
    pub async fn audit_trail(
        &self,
        target_type: TargetType,
        target_id: &str,
        limit: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        self.moderation
            .actions_for_target(target_type, target_id, limit)
            .await
    }

    /// Recent audit records across the platform.
    pub async fn recent_actions(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<moderation_action::Model>> {
        self.moderation.recent_actions(limit, offset).await
    }

    #[allow(clippy::too_many_arguments)]
    async fn apply_to_user(
        &self,
        actor: &user::Model,
        target_id: &str,
        stream: Option<&stream::Model>,
        action: ActionKind,
        reason: Option<String>,
        duration_secs: Option<i64>,
        now: DateTime<FixedOffset>,
    ) -> AppResult<ModerationOutcome> {
        if actor.id == target_id {
            return Err(AppError::BadRequest(
                "Cannot moderate yourself".to_string(),
            ));
        }

        let target = self.users.get_by_id(target_id).await?;

        match action {
            ActionKind::Mute => {
                guard_staff_target(actor, &target)?;
                let reason = required_reason(reason, "Mute")?;
                let duration = Duration::seconds(
                    duration_secs.unwrap_or(self.default_mute_minutes * 60),
                );

                let mute = mute::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(target.id.clone()),
                    stream_id: Set(stream.map(|s| s.id.clone())),
                    moderator_id: Set(actor.id.clone()),
                    reason: Set(reason.clone()),
                    expires_at: Set(now + duration),
                    created_at: Set(now),
                };
                let audit = self.audit_record(
                    actor,
                    TargetType::User,
                    &target.id,
                    ActionKind::Mute,
                    Some(reason),
                    Some(duration.num_seconds()),
                    now,
                );

                let (_, audit) = self.moderation.mute_with_audit(mute, audit).await?;
                info!(actor_id = %actor.id, target_id = %target.id, "User muted");
                Ok(outcome(audit))
            }
            ActionKind::Ban => {
                guard_staff_target(actor, &target)?;
                let reason = required_reason(reason, "Ban")?;
                let expires_at = duration_secs.map(|secs| now + Duration::seconds(secs));

                let mut model: user::ActiveModel = target.clone().into();
                model.status = Set(AccountStatus::Banned);
                model.ban_reason = Set(Some(reason.clone()));
                model.ban_expires_at = Set(expires_at);
                model.updated_at = Set(Some(now));

                let audit = self.audit_record(
                    actor,
                    TargetType::User,
                    &target.id,
                    ActionKind::Ban,
                    Some(reason),
                    duration_secs,
                    now,
                );

                let (_, audit) = self.moderation.ban_with_audit(model, audit).await?;
                info!(
                    actor_id = %actor.id,
                    target_id = %target.id,
                    permanent = expires_at.is_none(),
                    "User banned"
                );
                Ok(outcome(audit))
            }
            ActionKind::Warn => {
                // Audit-only: no state mutation beyond the log.
                let audit = self.audit_record(
                    actor,
                    TargetType::User,
                    &target.id,
                    ActionKind::Warn,
                    reason,
                    None,
                    now,
                );
                let audit = self.moderation.record_audit(audit).await?;
                info!(actor_id = %actor.id, target_id = %target.id, "User warned");
                Ok(outcome(audit))
            }
            ActionKind::DeleteMessage => Err(AppError::BadRequest(
                "delete_message requires a message target".to_string(),
            )),
        }
    }

    async fn apply_to_message(
        &self,
        actor: &user::Model,
        message: chat_message::Model,
        action: ActionKind,
        reason: Option<String>,
        now: DateTime<FixedOffset>,
    ) -> AppResult<ModerationOutcome> {
        if action != ActionKind::DeleteMessage {
            return Err(AppError::BadRequest(format!(
                "{} requires a user target",
                action.as_str()
            )));
        }

        let message_id = message.id.clone();
        let mut model: chat_message::ActiveModel = message.into();
        model.is_deleted = Set(true);

        let audit = self.audit_record(
            actor,
            TargetType::Message,
            &message_id,
            ActionKind::DeleteMessage,
            reason,
            None,
            now,
        );

        let (_, audit) = self
            .moderation
            .delete_message_with_audit(model, audit)
            .await?;
        info!(actor_id = %actor.id, message_id = %message_id, "Message deleted");
        Ok(outcome(audit))
    }

    #[allow(clippy::too_many_arguments)]
    fn audit_record(
        &self,
        actor: &user::Model,
        target_type: TargetType,
        target_id: &str,
        action: ActionKind,
        reason: Option<String>,
        duration_secs: Option<i64>,
        now: DateTime<FixedOffset>,
    ) -> moderation_action::ActiveModel {
        moderation_action::ActiveModel {
            id: Set(self.id_gen.generate()),
            actor_id: Set(actor.id.clone()),
            target_type: Set(target_type),
            target_id: Set(target_id.to_string()),
            action: Set(action),
            reason: Set(reason),
            duration_secs: Set(duration_secs),
            created_at: Set(now),
        }
    }
}

/// Upper bound on restriction durations, ten years in seconds. Keeps
/// `expires_at` arithmetic well inside what chrono can represent.
const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 3600;

/// A supplied duration must be positive and bounded; `None` keeps its
/// action-specific meaning (default mute length, permanent ban).
fn validated_duration(duration_secs: Option<i64>) -> AppResult<Option<i64>> {
    match duration_secs {
        Some(secs) if secs <= 0 => Err(AppError::BadRequest(
            "Duration must be positive".to_string(),
        )),
        Some(secs) if secs > MAX_DURATION_SECS => Err(AppError::BadRequest(
            "Duration exceeds the maximum".to_string(),
        )),
        other => Ok(other),
    }
}

/// Staff can always moderate; a creator may moderate within their own stream.
fn authorize(actor: &user::Model, stream: Option<&stream::Model>) -> AppResult<()> {
    if actor.role.is_staff() {
        return Ok(());
    }
    if let Some(stream) = stream {
        if stream.creator_id == actor.id {
            return Ok(());
        }
    }
    Err(AppError::Forbidden(
        "Not authorized to moderate this stream".to_string(),
    ))
}

/// Admins cannot be restricted; moderators may only be restricted by admins.
fn guard_staff_target(actor: &user::Model, target: &user::Model) -> AppResult<()> {
    match target.role {
        UserRole::Admin => Err(AppError::Forbidden(
            "Cannot restrict an admin".to_string(),
        )),
        UserRole::Moderator if actor.role != UserRole::Admin => Err(AppError::Forbidden(
            "Only an admin can restrict a moderator".to_string(),
        )),
        _ => Ok(()),
    }
}

fn required_reason(reason: Option<String>, action: &str) -> AppResult<String> {
    match reason.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(AppError::BadRequest(format!("{action} reason is required"))),
    }
}

fn outcome(audit: moderation_action::Model) -> ModerationOutcome {
    ModerationOutcome {
        audit_id: audit.id,
        action: audit.action,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use streamgate_db::entities::stream::StreamStatus;

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ModerationService {
        ModerationService::new(
            UserRepository::new(db.clone()),
            StreamRepository::new(db.clone()),
            ChatMessageRepository::new(db.clone()),
            ModerationRepository::new(db),
            &ModerationConfig::default(),
        )
    }

    fn account(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user-{id}"),
            role,
            status: AccountStatus::Active,
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

    fn audit_row(id: &str, action: ActionKind) -> moderation_action::Model {
        moderation_action::Model {
            id: id.to_string(),
            actor_id: "mod1".to_string(),
            target_type: TargetType::User,
            target_id: "user1".to_string(),
            action,
            reason: Some("spam".to_string()),
            duration_secs: None,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[test]
    fn unknown_action_kind_is_rejected_before_any_write() {
        let err = ModerationService::parse_action("shadowban").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn known_action_kinds_parse() {
        assert_eq!(
            ModerationService::parse_action("delete_message").unwrap(),
            ActionKind::DeleteMessage
        );
    }

    #[tokio::test]
    async fn non_positive_duration_is_rejected_before_any_query() {
        // No query results appended: validation must short-circuit.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::Mute,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: Some("spam".to_string()),
                    duration_secs: Some(0),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn oversized_duration_is_rejected_before_any_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let err = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::Ban,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: Some("abuse".to_string()),
                    duration_secs: Some(i64::MAX),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn unresolvable_actor_fails_closed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let err = service(db)
            .apply(
                "ghost",
                ModerationInput {
                    action: ActionKind::Warn,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: None,
                    duration_secs: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn viewer_cannot_moderate_outside_their_own_stream() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account("user2", UserRole::Viewer)]])
                .append_query_results([[live_stream("s1", "creator1")]])
                .into_connection(),
        );

        let err = service(db)
            .apply(
                "user2",
                ModerationInput {
                    action: ActionKind::Mute,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: Some("s1".to_string()),
                    },
                    reason: Some("spam".to_string()),
                    duration_secs: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_cannot_be_banned() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account("mod1", UserRole::Moderator)]])
                .append_query_results([[account("admin1", UserRole::Admin)]])
                .into_connection(),
        );

        let err = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::Ban,
                    target: ModerationTarget::User {
                        user_id: "admin1".to_string(),
                        stream_id: None,
                    },
                    reason: Some("power struggle".to_string()),
                    duration_secs: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn ban_without_reason_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account("mod1", UserRole::Moderator)]])
                .append_query_results([[account("user1", UserRole::Viewer)]])
                .into_connection(),
        );

        let err = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::Ban,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: Some("   ".to_string()),
                    duration_secs: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn warn_writes_only_an_audit_record() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account("mod1", UserRole::Moderator)]])
                .append_query_results([[account("user1", UserRole::Viewer)]])
                .append_query_results([[audit_row("audit1", ActionKind::Warn)]])
                .into_connection(),
        );

        let outcome = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::Warn,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: Some("tone it down".to_string()),
                    duration_secs: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(outcome.audit_id, "audit1");
        assert_eq!(outcome.action, ActionKind::Warn);
    }

    #[tokio::test]
    async fn delete_message_requires_a_message_target() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account("mod1", UserRole::Moderator)]])
                .append_query_results([[account("user1", UserRole::Viewer)]])
                .into_connection(),
        );

        let err = service(db)
            .apply(
                "mod1",
                ModerationInput {
                    action: ActionKind::DeleteMessage,
                    target: ModerationTarget::User {
                        user_id: "user1".to_string(),
                        stream_id: None,
                    },
                    reason: None,
                    duration_secs: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
