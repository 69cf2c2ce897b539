//! Task Repository: task rows, list queries and sequence lookups.

use crate::engine::types::{StoredStatus, Task};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

pub const TASK_SELECT: &str =
    "SELECT id, worker, task, deadline, finish_date, status, chain_id, ord, archive FROM tasks";

/// Fields of a task row before the database assigns its id.
#[derive(Debug, Clone)]
pub struct NewTask<'n> {
    pub chain: i64,
    pub order: u32,
    pub worker: &'n str,
    pub task: &'n str,
    pub deadline: NaiveDate,
    pub finish_date: Option<NaiveDate>,
    pub status: StoredStatus,
    pub archive: bool,
}

pub struct TaskRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TaskRepo<'a> {
    /// Creates a new repository instance borrowing the connection.
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Adds a new task to the database.
    ///
    /// # Errors
    /// Returns an error if the insertion fails (e.g. duplicate order).
    pub fn add(&self, new: &NewTask<'_>) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO tasks (worker, task, deadline, finish_date, status, chain_id, ord, archive)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.worker,
                    new.task,
                    new.deadline,
                    new.finish_date,
                    new.status.to_string(),
                    new.chain,
                    new.order,
                    new.archive
                ],
            )
            .with_context(|| format!("Failed to add task #{} of chain {}", new.order, new.chain))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Finds a task by its internal ID.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], row_to_task)
            .optional()
            .context("Search by ID failed")
    }

    /// Finds the task at `order` within a chain.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if query logic fails.
    pub fn find_by_order(&self, chain_id: i64, order: u32) -> rusqlite::Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE chain_id = ?1 AND ord = ?2");
        self.conn
            .query_row(&sql, params![chain_id, order], row_to_task)
            .optional()
    }

    /// Finds the task with the highest order in a chain.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if query logic fails.
    pub fn find_last(&self, chain_id: i64) -> rusqlite::Result<Option<Task>> {
        let sql = format!("{TASK_SELECT} WHERE chain_id = ?1 ORDER BY ord DESC LIMIT 1");
        self.conn
            .query_row(&sql, params![chain_id], row_to_task)
            .optional()
    }

    /// Tasks of a chain carrying the given stored status.
    ///
    /// # Errors
    /// Returns a `rusqlite` error if query logic fails.
    pub fn with_status(&self, chain_id: i64, status: StoredStatus) -> rusqlite::Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE chain_id = ?1 AND status = ?2 ORDER BY ord");
        self.collect(&sql, params![chain_id, status.to_string()])
    }

    /// All tasks of a chain in order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn by_chain(&self, chain_id: i64) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE chain_id = ?1 ORDER BY ord");
        self.collect(&sql, params![chain_id])
            .context("Listing chain tasks failed")
    }

    /// Current (non-archived) tasks of a worker, nearest deadline first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn actual_by_worker(&self, worker: &str) -> Result<Vec<Task>> {
        let sql = format!("{TASK_SELECT} WHERE worker = ?1 AND archive = 0 ORDER BY deadline, id");
        self.collect(&sql, params![worker])
            .context("Listing actual tasks failed")
    }

    /// Archived tasks of a worker, latest deadline first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn archived_by_worker(&self, worker: &str) -> Result<Vec<Task>> {
        let sql =
            format!("{TASK_SELECT} WHERE worker = ?1 AND archive = 1 ORDER BY deadline DESC, id");
        self.collect(&sql, params![worker])
            .context("Listing archived tasks failed")
    }

    fn collect(&self, sql: &str, params: impl rusqlite::Params) -> rusqlite::Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, row_to_task)?;
        let mut tasks = Vec::new();
        for task in rows {
            tasks.push(task?);
        }
        Ok(tasks)
    }
}

/// Converts a database row (in `TASK_SELECT` column order) to a Task.
///
/// # Errors
/// Returns a `rusqlite` error if data conversion fails.
pub fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        worker: row.get(1)?,
        task: row.get(2)?,
        deadline: row.get(3)?,
        finish_date: row.get(4)?,
        status: StoredStatus::from(row.get::<_, String>(5)?),
        chain: row.get(6)?,
        order: row.get(7)?,
        archive: row.get(8)?,
    })
}
