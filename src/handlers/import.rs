//! Handler for the `import` command.

use super::Session;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use taskchain::engine::db::Db;
use taskchain::engine::import::Snapshot;

/// Loads a JSON snapshot of chains into the database.
///
/// # Errors
/// Returns error if the snapshot is malformed or cannot be written.
pub fn handle(session: &Session, file: &Path) -> Result<()> {
    let mut conn = Db::connect(&session.db)?;
    let snapshot = Snapshot::load(file)?;
    let summary = snapshot.import(&mut conn)?;
    println!(
        "{} Imported {} chains ({} tasks) from {}",
        "✓".green(),
        summary.chains,
        summary.tasks,
        file.display()
    );
    Ok(())
}
