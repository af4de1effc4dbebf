// Core moderation module - banned-word filter and the post review workflow.

pub mod banned_words;
pub mod moderation_models;
pub mod moderation_service;

pub use banned_words::*;
pub use moderation_models::*;
pub use moderation_service::*;
