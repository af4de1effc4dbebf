// CLI layer - argument parsing and command handlers.

#[path = "commands.rs"]
pub mod commands;

#[path = "handlers.rs"]
pub mod handlers;

use crate::core::members::MemberDirectory;
use crate::core::moderation::ModerationService;
use crate::infra::members::SqliteMemberStore;
use crate::infra::moderation::SqlitePostStore;
use crate::infra::notifications::ModeratorNotifier;

pub use commands::{parse_command, BoardCommand, USAGE};

/// Services shared by every command.
pub struct Data {
    pub moderation: ModerationService<SqlitePostStore, ModeratorNotifier>,
    pub members: MemberDirectory<SqliteMemberStore>,
}

pub type Error = anyhow::Error;
