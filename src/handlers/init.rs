//! Handler for the `init` command.

use super::Session;
use anyhow::Result;
use colored::Colorize;
use taskchain::engine::db::Db;

/// Initializes the database.
///
/// # Errors
/// Returns error if database initialization fails.
pub fn handle(session: &Session) -> Result<()> {
    Db::init(&session.db)?;
    println!("{} Initialized {}", "✓".green(), session.db.display());
    Ok(())
}
