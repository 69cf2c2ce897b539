//! Snapshot import: loads already-ordered chains from JSON into the store.
//!
//! The importer does not create or reorder sequences. It only accepts
//! snapshots whose chains already satisfy the ordering invariants.

use super::repo::{ChainRepo, NewChain, NewTask, TaskRepo};
use super::sequence::ordering_defect;
use super::types::{StoredStatus, Task};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Snapshot {
    pub chains: Vec<ChainEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ChainEntry {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub priority: i64,
    pub owner: String,
    #[serde(default)]
    pub archive: bool,
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TaskEntry {
    pub worker: String,
    pub task: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub finish_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: StoredStatus,
    pub order: u32,
    #[serde(default)]
    pub archive: bool,
}

impl TaskEntry {
    /// The record this entry would become, with placeholder ids.
    fn as_task(&self, position: usize) -> Task {
        Task {
            id: i64::try_from(position).unwrap_or(i64::MAX),
            worker: self.worker.clone(),
            task: self.task.clone(),
            deadline: self.deadline,
            finish_date: self.finish_date,
            status: self.status,
            chain: 0,
            order: self.order,
            archive: self.archive,
        }
    }
}

/// Counts of imported records.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub chains: usize,
    pub tasks: usize,
}

impl Snapshot {
    /// # Errors
    /// Returns error if the text is not a valid snapshot.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid snapshot JSON")
    }

    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Checks every chain's ordering and every task record.
    ///
    /// # Errors
    /// Names the first offending chain.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.chains {
            for (position, task) in entry.tasks.iter().enumerate() {
                task.as_task(position)
                    .validate()
                    .with_context(|| format!("Chain '{}' is malformed", entry.name))?;
            }
            if let Some(reason) = ordering_defect(entry.tasks.iter().map(|t| t.order)) {
                bail!("Chain '{}' has broken ordering: {reason}", entry.name);
            }
        }
        Ok(())
    }

    /// Validates, then inserts every chain and task in one transaction.
    ///
    /// # Errors
    /// Returns error if validation or any insert fails; nothing is written then.
    pub fn import(&self, conn: &mut Connection) -> Result<ImportSummary> {
        self.validate()?;

        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();
        {
            let chains = ChainRepo::new(&tx);
            let tasks = TaskRepo::new(&tx);
            for entry in &self.chains {
                let chain_id = chains.add(&NewChain {
                    name: &entry.name,
                    start_date: entry.start_date,
                    priority: entry.priority,
                    owner: &entry.owner,
                    archive: entry.archive,
                })?;
                for task in &entry.tasks {
                    tasks.add(&NewTask {
                        chain: chain_id,
                        order: task.order,
                        worker: &task.worker,
                        task: &task.task,
                        deadline: task.deadline,
                        finish_date: task.finish_date,
                        status: task.status,
                        archive: task.archive,
                    })?;
                }
                summary.chains += 1;
                summary.tasks += entry.tasks.len();
            }
        }
        tx.commit()?;

        info!(chains = summary.chains, tasks = summary.tasks, "snapshot imported");
        Ok(summary)
    }
}
