//! Database entities.

pub mod chat_message;
pub mod moderation_action;
pub mod mute;
pub mod stream;
pub mod user;
pub mod wallet;

pub use chat_message::Entity as ChatMessage;
pub use moderation_action::Entity as ModerationAction;
pub use mute::Entity as Mute;
pub use stream::Entity as Stream;
pub use user::Entity as User;
pub use wallet::Entity as Wallet;
