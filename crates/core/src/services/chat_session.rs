//! Chat session orchestrator.
//!
//! Ties the pieces together: joining a stream's chat yields a room
//! access token when eligibility allows it, and posting a message runs
//! validation, eligibility, and persistence in that order.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use streamgate_common::{AppError, AppResult, IdGenerator};
use streamgate_db::{
    entities::chat_message,
    repositories::{ChatMessageRepository, StreamRepository},
};
use tracing::info;

use super::access_token::{AccessTokenService, GrantRole};
use super::eligibility::{ChatEligibilityService, DenialReason};
use super::message_validator::MessageValidator;

/// Outcome of an access request: either a token or a denial reason.
#[derive(Debug, Clone, Serialize)]
pub struct AccessDecision {
    /// Whether access was granted.
    pub granted: bool,
    /// Room token, present only when granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Granted room role, present only when granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<GrantRole>,
    /// Denial reason code, present only when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl AccessDecision {
    fn granted(token: String, role: GrantRole) -> Self {
        Self {
            granted: true,
            token: Some(token),
            role: Some(role),
            reason: None,
        }
    }

    const fn denied(reason: DenialReason) -> Self {
        Self {
            granted: false,
            token: None,
            role: None,
            reason: Some(reason),
        }
    }
}

/// Outcome of posting a message. Denials are part of normal operation
/// and are not errors.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// The message was accepted and persisted.
    Posted(chat_message::Model),
    /// The sender is not currently eligible to chat.
    Denied(DenialReason),
}

/// Chat session orchestrator.
#[derive(Clone)]
pub struct ChatSessionOrchestrator {
    streams: StreamRepository,
    eligibility: ChatEligibilityService,
    validator: MessageValidator,
    tokens: AccessTokenService,
    messages: ChatMessageRepository,
    id_gen: IdGenerator,
}

impl ChatSessionOrchestrator {
    /// Create a new orchestrator.
    #[must_use]
    pub const fn new(
        streams: StreamRepository,
        eligibility: ChatEligibilityService,
        validator: MessageValidator,
        tokens: AccessTokenService,
        messages: ChatMessageRepository,
    ) -> Self {
        Self {
            streams,
            eligibility,
            validator,
            tokens,
            messages,
            id_gen: IdGenerator::new(),
        }
    }

    /// Request access to a stream's chat. A granted decision carries a
    /// signed room token; a denied one carries the reason and nothing
    /// else.
    pub async fn request_access(
        &self,
        account_id: &str,
        stream_id: &str,
    ) -> AppResult<AccessDecision> {
        let stream = self.streams.get_by_id(stream_id).await?;
        if !stream.status.is_joinable() {
            return Ok(AccessDecision::denied(DenialReason::StreamNotLive));
        }

        let (account, decision) = self.eligibility.evaluate(account_id, &stream).await?;
        if let Some(reason) = decision.denial() {
            return Ok(AccessDecision::denied(reason));
        }

        let role = GrantRole::for_account(&account, &stream.creator_id);
        let issued = self.tokens.issue(account_id, stream_id, role)?;
        info!(account_id, stream_id, role = ?role, "Chat access granted");
        Ok(AccessDecision::granted(issued.token, role))
    }

    /// Post a message to a stream's chat. Validation rejections are
    /// errors (the caller sent a bad payload); eligibility denials are
    /// values.
    pub async fn post_message(
        &self,
        account_id: &str,
        stream_id: &str,
        text: &str,
    ) -> AppResult<SendOutcome> {
        // Validate before touching the database.
        let validated = self
            .validator
            .validate(text)
            .map_err(|r| AppError::Validation(r.to_string()))?;

        let stream = self.streams.get_by_id(stream_id).await?;
        if !stream.status.is_joinable() {
            return Ok(SendOutcome::Denied(DenialReason::StreamNotLive));
        }

        let (_, decision) = self.eligibility.evaluate(account_id, &stream).await?;
        if let Some(reason) = decision.denial() {
            return Ok(SendOutcome::Denied(reason));
        }

        let model = chat_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            stream_id: Set(stream.id.clone()),
            user_id: Set(account_id.to_string()),
            text: Set(validated.text),
            is_deleted: Set(false),
            created_at: Set(Utc::now().fixed_offset()),
        };
        let message = self.messages.create(model).await?;
        info!(account_id, stream_id, message_id = %message.id, "Message posted");
        Ok(SendOutcome::Posted(message))
    }
}
