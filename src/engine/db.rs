//! Database location, connection and schema.

use anyhow::{bail, Context, Result};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub const DB_DIR: &str = ".taskchain";
pub const DB_FILE: &str = "state.db";

pub struct Db;

impl Db {
    /// Default database path relative to the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        Path::new(DB_DIR).join(DB_FILE)
    }

    /// Creates the parent directory and the schema at `path`.
    ///
    /// # Errors
    /// Returns error if directory creation, DB opening, or migration fails.
    pub fn init(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let conn = Connection::open(path).context("Failed to open database")?;
        Self::migrate(&conn)
    }

    /// Connects to an existing database.
    ///
    /// # Errors
    /// Returns error if the database file does not exist or cannot be opened.
    pub fn connect(path: &Path) -> Result<Connection> {
        if !path.exists() {
            bail!(
                "No database at {}. Run `taskchain init` first.",
                path.display()
            );
        }
        let conn = Connection::open(path).context("Failed to open database")?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;
        Ok(conn)
    }

    /// Opens a migrated in-memory database.
    ///
    /// # Errors
    /// Returns error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open database")?;
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;
        Self::migrate(&conn)?;
        Ok(conn)
    }

    /// Applies the schema migrations.
    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chains (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                start_date TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 0,
                owner TEXT NOT NULL,
                archive INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .context("Failed to create chains table")?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                worker TEXT NOT NULL,
                task TEXT NOT NULL,
                deadline TEXT NOT NULL,
                finish_date TEXT,
                status TEXT NOT NULL DEFAULT 'UNCERTAIN',
                chain_id INTEGER NOT NULL,
                ord INTEGER NOT NULL CHECK (ord > 0),
                archive INTEGER NOT NULL DEFAULT 0,
                UNIQUE (chain_id, ord),
                FOREIGN KEY(chain_id) REFERENCES chains(id)
            )",
            [],
        )
        .context("Failed to create tasks table")?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS tasks_worker ON tasks (worker, archive, deadline)",
            [],
        )
        .context("Failed to create tasks index")?;

        Ok(())
    }
}
