//! Report snapshots: every derived value of a task or chain, computed once.
//!
//! Designed for list and detail rendering, where the same derivations would
//! otherwise be repeated per column.

use super::chain::ChainTimeline;
use super::clock::{Clock, FixedClock};
use super::error::EngineError;
use super::sequence::SequenceAccessor;
use super::task::TaskTimeline;
use super::types::{ActualStatus, Chain, StoredStatus, Task};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskReport {
    pub id: i64,
    pub chain: i64,
    pub order: u32,
    pub worker: String,
    pub task: String,
    pub deadline: NaiveDate,
    pub finish_date: Option<NaiveDate>,
    pub stored_status: StoredStatus,
    pub status: ActualStatus,
    pub start_date: Option<NaiveDate>,
    pub duration: i64,
    pub remaining_days: Option<i64>,
    pub days_after_deadline: Option<i64>,
    pub expended_days: Option<i64>,
    pub days_to_start: Option<i64>,
    pub in_time: bool,
}

impl TaskReport {
    /// Evaluates every metric of the timeline.
    ///
    /// # Errors
    /// The first derivation error encountered.
    pub fn build<A: SequenceAccessor + ?Sized>(
        timeline: &TaskTimeline<'_, A>,
    ) -> Result<Self, EngineError> {
        let task = timeline.task();
        let days_after_deadline = timeline.days_quantity_after_deadline()?;
        Ok(Self {
            id: task.id,
            chain: task.chain,
            order: task.order,
            worker: task.worker.clone(),
            task: task.task.clone(),
            deadline: task.deadline,
            finish_date: task.finish_date,
            stored_status: task.status,
            status: timeline.actual_status()?,
            start_date: timeline.start_date()?,
            duration: timeline.duration()?,
            remaining_days: timeline.remaining_days(),
            days_after_deadline,
            expended_days: timeline.expended_days()?,
            days_to_start: timeline.days_to_start()?,
            in_time: days_after_deadline.is_none(),
        })
    }
}

/// Aggregate counts of tasks by actual status.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub wait: usize,
    pub work: usize,
    pub done: usize,
    pub stop: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ActualStatus) {
        match status {
            ActualStatus::Wait => self.wait += 1,
            ActualStatus::Work => self.work += 1,
            ActualStatus::Done => self.done += 1,
            ActualStatus::Stop => self.stop += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.wait + self.work + self.done + self.stop
    }
}

/// A task of a chain whose report could not be derived.
#[derive(Debug, Clone, Serialize)]
pub struct TaskIssue {
    pub id: i64,
    pub order: u32,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainReport {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub priority: i64,
    pub start_date: NaiveDate,
    /// Unknown for a chain that has no tasks yet.
    pub deadline: Option<NaiveDate>,
    pub status: ActualStatus,
    pub counts: StatusCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TaskReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<TaskIssue>,
}

impl ChainReport {
    /// Summarises a chain. `tasks` are the chain's tasks in order; pass an
    /// empty slice for list views that only need the header.
    ///
    /// A task that cannot be derived lands in `issues` and is left out of
    /// `counts`; the chain itself must still derive.
    ///
    /// # Errors
    /// Any derivation error of the chain status, including `EmptyChain` for a
    /// started chain without tasks.
    pub fn build<A: SequenceAccessor + ?Sized>(
        timeline: &ChainTimeline<'_, A>,
        tasks: &[Task],
    ) -> Result<Self, EngineError> {
        let chain = timeline.chain();
        let status = timeline.actual_status()?;
        let deadline = match timeline.deadline() {
            Ok(deadline) => Some(deadline),
            Err(EngineError::EmptyChain { .. }) => None,
            Err(e) => return Err(e),
        };
        let mut counts = StatusCounts::default();
        let mut reports = Vec::with_capacity(tasks.len());
        let mut issues = Vec::new();
        for task in tasks {
            match TaskReport::build(&timeline.task(task)) {
                Ok(report) => {
                    counts.record(report.status);
                    reports.push(report);
                }
                Err(e) => {
                    warn!(chain = chain.id, task = task.id, error = %e, "cannot derive task report");
                    issues.push(TaskIssue {
                        id: task.id,
                        order: task.order,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(Self {
            id: chain.id,
            name: chain.name.clone(),
            owner: chain.owner.clone(),
            priority: chain.priority,
            start_date: chain.start_date,
            deadline,
            status,
            counts,
            tasks: reports,
            issues,
        })
    }
}

/// A task paired with its report, or with the reason it could not be derived.
#[derive(Debug)]
pub struct TaskRow<'t> {
    pub task: &'t Task,
    pub report: Result<TaskReport, EngineError>,
}

/// Batch-derives reports for a list of tasks from possibly different chains.
///
/// Reads the clock once, so every row agrees on today. A task whose data is
/// broken yields an error row instead of failing the whole batch.
pub fn report_tasks<'t, A: SequenceAccessor + ?Sized>(
    tasks: &'t [Task],
    accessor: &A,
    clock: &impl Clock,
) -> Vec<TaskRow<'t>> {
    let today = FixedClock(clock.today());
    tasks
        .iter()
        .map(|task| {
            let report = TaskTimeline::new(task, accessor, &today)
                .and_then(|timeline| TaskReport::build(&timeline));
            if let Err(e) = &report {
                warn!(task = task.id, error = %e, "cannot derive task report");
            }
            TaskRow { task, report }
        })
        .collect()
}

/// Batch-derives chain headers (no task rows). Broken chains come back as
/// errors next to their record.
pub fn report_chains<'c, A: SequenceAccessor + ?Sized>(
    chains: &'c [Chain],
    accessor: &A,
    clock: &impl Clock,
) -> Vec<(&'c Chain, Result<ChainReport, EngineError>)> {
    let today = FixedClock(clock.today());
    chains
        .iter()
        .map(|chain| {
            let report = ChainReport::build(&ChainTimeline::new(chain, accessor, &today), &[]);
            if let Err(e) = &report {
                warn!(chain = chain.id, error = %e, "cannot derive chain report");
            }
            (chain, report)
        })
        .collect()
}
