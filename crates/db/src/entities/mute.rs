//! Mute entity (moderator-issued chat restrictions).
//!
//! Mutes are always temporary: `expires_at` is NOT NULL. A NULL
//! `stream_id` means the mute applies across all streams. Multiple
//! mutes for the same (user, stream) pair may coexist; any non-expired
//! row denies chat.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "mute")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The muted user.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Stream the mute is scoped to (NULL = global).
    #[sea_orm(nullable, indexed)]
    pub stream_id: Option<String>,

    /// The moderator or creator who issued the mute.
    pub moderator_id: String,

    pub reason: String,

    /// When the mute expires. Always set.
    pub expires_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether this mute denies the user chat in `stream_id` at `now`.
    /// The SQL filters in the repository narrow to candidate rows;
    /// this predicate is the deciding one.
    #[must_use]
    pub fn applies(&self, stream_id: &str, now: DateTimeWithTimeZone) -> bool {
        self.expires_at > now
            && self
                .stream_id
                .as_deref()
                .is_none_or(|scoped| scoped == stream_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::stream::Entity",
        from = "Column::StreamId",
        to = "super::stream::Column::Id",
        on_delete = "Cascade"
    )]
    Stream,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::stream::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stream.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
