//! Business logic services.

pub mod access_token;
pub mod chat_session;
pub mod eligibility;
pub mod jobs;
pub mod message_validator;
pub mod moderation;
pub mod restriction;

pub use access_token::{AccessTokenService, GrantRole, IssuedToken, RoomClaims};
pub use chat_session::{AccessDecision, ChatSessionOrchestrator, SendOutcome};
pub use eligibility::{ChatEligibilityService, DenialReason, EligibilityDecision};
pub use jobs::spawn_restriction_sweeper;
pub use message_validator::{MessageRejection, MessageValidator, ValidatedMessage};
pub use moderation::{
    ActionKind, ModerationInput, ModerationOutcome, ModerationService, ModerationTarget,
    TargetType,
};
pub use restriction::{
    ActiveRestriction, RestrictionKind, RestrictionService, SweepOutcome, active_restriction,
    format_remaining,
};
