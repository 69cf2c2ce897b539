//! CLI command handlers.

pub mod chain;
pub mod chains;
pub mod import;
pub mod init;
pub mod render;
pub mod task;
pub mod tasks;

use std::path::PathBuf;
use taskchain::engine::clock::FixedClock;

/// Settings shared by every command.
pub struct Session {
    pub db: PathBuf,
    /// Today, read once at startup
    pub clock: FixedClock,
}
