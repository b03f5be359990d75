//! Database repositories.

pub mod chat_message;
pub mod moderation;
pub mod mute;
pub mod stream;
pub mod user;
pub mod wallet;

pub use chat_message::ChatMessageRepository;
pub use moderation::ModerationRepository;
pub use mute::MuteRepository;
pub use stream::StreamRepository;
pub use user::UserRepository;
pub use wallet::WalletRepository;
