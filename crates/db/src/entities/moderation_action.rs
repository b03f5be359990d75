//! Moderation action audit entity.
//!
//! Append-only: rows are created by the moderation service and never
//! updated or deleted, including for actions that race each other.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[sea_orm(string_value = "mute")]
    Mute,
    #[sea_orm(string_value = "ban")]
    Ban,
    #[sea_orm(string_value = "delete_message")]
    DeleteMessage,
    #[sea_orm(string_value = "warn")]
    Warn,
}

impl ActionKind {
    /// Stable wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mute => "mute",
            Self::Ban => "ban",
            Self::DeleteMessage => "delete_message",
            Self::Warn => "warn",
        }
    }
}

impl FromStr for ActionKind {
    type Err = String;

    /// Unknown kinds are rejected here, before anything is written.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mute" => Ok(Self::Mute),
            "ban" => Ok(Self::Ban),
            "delete_message" => Ok(Self::DeleteMessage),
            "warn" => Ok(Self::Warn),
            other => Err(format!("Unknown moderation action: {other}")),
        }
    }
}

/// What the action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "message")]
    Message,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "moderation_action")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Moderator, admin, or stream creator who issued the action.
    #[sea_orm(indexed)]
    pub actor_id: String,

    pub target_type: TargetType,

    #[sea_orm(indexed)]
    pub target_id: String,

    pub action: ActionKind,

    #[sea_orm(nullable)]
    pub reason: Option<String>,

    /// Restriction duration in seconds (None = permanent or n/a).
    #[sea_orm(nullable)]
    pub duration_secs: Option<i64>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
