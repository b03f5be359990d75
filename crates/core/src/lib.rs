//! Core business logic for streamgate: chat eligibility, moderation,
//! restriction expiry, and media-room access token issuance.

pub mod services;

pub use services::*;
