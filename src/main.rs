// This is the entry point of the message board tool.
//
// **Architecture Overview:**
// - `core/` = Business logic (storage-agnostic)
// - `infra/` = Implementations of core traits (SQLite, SMTP)
// - `cli/` = Command-line adapter (argument parsing, handlers)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Parse the command and hand it to the CLI layer

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "cli/cli_layer.rs"]
mod cli;
mod config;
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::cli::{handlers, parse_command, BoardCommand, Data, USAGE};
use crate::config::BoardConfig;
use crate::core::members::MemberDirectory;
use crate::core::moderation::{banned_words, init_banned_words, BannedWords, ModerationService};
use crate::infra::database::connect_sqlite;
use crate::infra::members::SqliteMemberStore;
use crate::infra::moderation::SqlitePostStore;
use crate::infra::notifications::ModeratorNotifier;
use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let command = match parse_command(std::env::args().skip(1)) {
        Ok(BoardCommand::Help) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let config = BoardConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let installed = init_banned_words(BannedWords::load(&config.banned_words_file));
    if installed.is_empty() {
        tracing::warn!("Banned word list is empty; submissions will not be filtered");
    } else {
        tracing::debug!(count = installed.len(), "Banned word filter ready");
    }

    let pool = connect_sqlite(&config.database_url).await?;

    // Members first: posts reference the members table
    let member_store = SqliteMemberStore::new(pool.clone());
    member_store
        .migrate()
        .await
        .context("Failed to migrate members table")?;
    let post_store = SqlitePostStore::new(pool);
    post_store
        .migrate()
        .await
        .context("Failed to migrate posts table")?;

    let notifier = ModeratorNotifier::from_settings(config.smtp.as_ref())
        .context("Failed to set up moderator notifications")?;

    let data = Data {
        moderation: ModerationService::new(post_store, notifier, banned_words()),
        members: MemberDirectory::new(member_store),
    };

    let output = handlers::run(&data, command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
