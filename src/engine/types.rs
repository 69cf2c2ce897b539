//! Core records for the chain system.
//!
//! Note: `ActualStatus` (the computed truth) is derived by `task.rs` and
//! `chain.rs`. `StoredStatus` here is the explicit override kept in SQLite.

use super::error::EngineError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order of the first task in every chain.
pub const FIRST_TASK: u32 = 1;

/// Stored status override.
///
/// `Uncertain` means "no override": the actual status is derived from the
/// schedule on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StoredStatus {
    #[default]
    Uncertain,
    Done,
    Stop,
}

impl StoredStatus {
    /// Explicit overrides map straight onto an actual status.
    #[must_use]
    pub fn as_override(self) -> Option<ActualStatus> {
        match self {
            StoredStatus::Done => Some(ActualStatus::Done),
            StoredStatus::Stop => Some(ActualStatus::Stop),
            StoredStatus::Uncertain => None,
        }
    }
}

impl fmt::Display for StoredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uncertain => write!(f, "UNCERTAIN"),
            Self::Done => write!(f, "DONE"),
            Self::Stop => write!(f, "STOP"),
        }
    }
}

impl From<String> for StoredStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "DONE" => Self::Done,
            "STOP" => Self::Stop,
            _ => Self::Uncertain,
        }
    }
}

/// The derived (computed) status of a task or a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActualStatus {
    /// Not started yet: the chain has not begun or the predecessor is not done
    Wait,
    /// In progress
    Work,
    /// Explicitly completed
    Done,
    /// Explicitly halted
    Stop,
}

impl ActualStatus {
    /// Returns the display color hint for rendering.
    #[must_use]
    pub fn color_hint(&self) -> &'static str {
        match self {
            ActualStatus::Wait => "gray",
            ActualStatus::Work => "amber",
            ActualStatus::Done => "green",
            ActualStatus::Stop => "red",
        }
    }
}

impl fmt::Display for ActualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActualStatus::Wait => write!(f, "WAIT"),
            ActualStatus::Work => write!(f, "WORK"),
            ActualStatus::Done => write!(f, "DONE"),
            ActualStatus::Stop => write!(f, "STOP"),
        }
    }
}

/// An ordered pipeline of dependent tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    pub id: i64,
    pub name: String,
    pub start_date: NaiveDate,
    pub priority: i64,
    pub owner: String,
    pub archive: bool,
}

/// A single stage of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub worker: String,
    /// Free-text description of the work
    pub task: String,
    pub deadline: NaiveDate,
    /// Set only once the task is `DONE`
    pub finish_date: Option<NaiveDate>,
    pub status: StoredStatus,
    pub chain: i64,
    pub order: u32,
    pub archive: bool,
}

impl Task {
    #[must_use]
    pub fn is_first(&self) -> bool {
        self.order == FIRST_TASK
    }

    /// Checks the per-record invariants: positive order and
    /// `finish_date` present iff the stored status is `DONE`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRecord` describing the first violation.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.order < FIRST_TASK {
            return Err(EngineError::InvalidRecord {
                task_id: self.id,
                reason: "order must be strictly positive".to_string(),
            });
        }
        match (self.status, self.finish_date) {
            (StoredStatus::Done, None) => Err(EngineError::InvalidRecord {
                task_id: self.id,
                reason: "DONE task has no finish date".to_string(),
            }),
            (StoredStatus::Uncertain | StoredStatus::Stop, Some(_)) => {
                Err(EngineError::InvalidRecord {
                    task_id: self.id,
                    reason: format!("{} task carries a finish date", self.status),
                })
            }
            _ => Ok(()),
        }
    }
}
