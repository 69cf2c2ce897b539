//! Chain Temporal Engine: the aggregate status of a whole pipeline.

use super::clock::Clock;
use super::error::EngineError;
use super::sequence::SequenceAccessor;
use super::task::TaskTimeline;
use super::types::{ActualStatus, Chain, StoredStatus, Task};
use chrono::NaiveDate;
use tracing::debug;

pub struct ChainTimeline<'a, A: SequenceAccessor + ?Sized> {
    chain: &'a Chain,
    accessor: &'a A,
    today: NaiveDate,
}

impl<'a, A: SequenceAccessor + ?Sized> ChainTimeline<'a, A> {
    #[must_use]
    pub fn new(chain: &'a Chain, accessor: &'a A, clock: &impl Clock) -> Self {
        Self {
            chain,
            accessor,
            today: clock.today(),
        }
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        self.chain
    }

    /// Binds one of this chain's tasks to the same chain and the same today.
    #[must_use]
    pub fn task<'t>(&'t self, task: &'t Task) -> TaskTimeline<'t, A> {
        TaskTimeline::with_chain(task, self.chain.clone(), self.accessor, self.today)
    }

    /// Derives the chain status.
    ///
    /// A chain waits until its start date. After that a single stored STOP
    /// anywhere halts it, and otherwise it is DONE only when its last task is.
    ///
    /// # Errors
    /// `EngineError::EmptyChain` if the chain has no tasks, or any error from
    /// deriving the last task.
    pub fn actual_status(&self) -> Result<ActualStatus, EngineError> {
        if self.chain.start_date > self.today {
            return Ok(ActualStatus::Wait);
        }
        let stopped = self
            .accessor
            .tasks_with_status(self.chain, StoredStatus::Stop)?;
        if !stopped.is_empty() {
            debug!(chain = self.chain.id, stopped = stopped.len(), "chain halted");
            return Ok(ActualStatus::Stop);
        }
        let last = self.accessor.last_task(self.chain)?;
        Ok(if self.task(&last).actual_status()? == ActualStatus::Done {
            ActualStatus::Done
        } else {
            ActualStatus::Work
        })
    }

    /// The deadline of the whole chain: that of its last task.
    ///
    /// # Errors
    /// `EngineError::EmptyChain` if the chain has no tasks.
    pub fn deadline(&self) -> Result<NaiveDate, EngineError> {
        Ok(self.accessor.last_task(self.chain)?.deadline)
    }
}
