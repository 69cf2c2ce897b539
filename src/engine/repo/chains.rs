//! Chain Repository: chain rows and owner queries.

use crate::engine::types::Chain;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

pub const CHAIN_SELECT: &str = "SELECT id, name, start_date, priority, owner, archive FROM chains";

#[derive(Debug, Clone)]
pub struct NewChain<'n> {
    pub name: &'n str,
    pub start_date: NaiveDate,
    pub priority: i64,
    pub owner: &'n str,
    pub archive: bool,
}

pub struct ChainRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ChainRepo<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a new chain to the database.
    ///
    /// # Errors
    /// Returns an error if the insertion fails.
    pub fn add(&self, new: &NewChain<'_>) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO chains (name, start_date, priority, owner, archive)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![new.name, new.start_date, new.priority, new.owner, new.archive],
            )
            .with_context(|| format!("Failed to add chain '{}'", new.name))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// # Errors
    /// Returns a `rusqlite` error if query logic fails.
    pub fn find_by_id(&self, id: i64) -> rusqlite::Result<Option<Chain>> {
        let sql = format!("{CHAIN_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_chain)
            .optional()
    }

    /// Current chains of an owner, earliest start first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn actual_by_owner(&self, owner: &str) -> Result<Vec<Chain>> {
        let sql =
            format!("{CHAIN_SELECT} WHERE owner = ?1 AND archive = 0 ORDER BY start_date, id");
        self.collect(&sql, owner)
            .context("Listing actual chains failed")
    }

    /// Archived chains of an owner, latest start first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn archived_by_owner(&self, owner: &str) -> Result<Vec<Chain>> {
        let sql = format!(
            "{CHAIN_SELECT} WHERE owner = ?1 AND archive = 1 ORDER BY start_date DESC, id"
        );
        self.collect(&sql, owner)
            .context("Listing archived chains failed")
    }

    fn collect(&self, sql: &str, owner: &str) -> rusqlite::Result<Vec<Chain>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params![owner], row_to_chain)?;
        let mut chains = Vec::new();
        for chain in rows {
            chains.push(chain?);
        }
        Ok(chains)
    }
}

/// Converts a database row (in `CHAIN_SELECT` column order) to a Chain.
///
/// # Errors
/// Returns a `rusqlite` error if data conversion fails.
pub fn row_to_chain(row: &rusqlite::Row) -> rusqlite::Result<Chain> {
    Ok(Chain {
        id: row.get(0)?,
        name: row.get(1)?,
        start_date: row.get(2)?,
        priority: row.get(3)?,
        owner: row.get(4)?,
        archive: row.get(5)?,
    })
}
