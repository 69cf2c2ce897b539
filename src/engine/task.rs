//! Task Temporal Engine: derives a task's actual status and schedule metrics.
//!
//! Nothing here is stored. Every call walks back to the predecessor through
//! the `SequenceAccessor`, and "today" comes from the clock captured when the
//! timeline was built.

use super::clock::Clock;
use super::error::EngineError;
use super::sequence::SequenceAccessor;
use super::types::{ActualStatus, Chain, StoredStatus, Task};
use chrono::{Days, NaiveDate};
use tracing::debug;

/// Whole days from `from` to `to` (negative if `to` is earlier).
fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date + Days::new(1)
}

/// A task bound to its chain, an accessor and a fixed "today".
pub struct TaskTimeline<'a, A: SequenceAccessor + ?Sized> {
    task: &'a Task,
    chain: Chain,
    accessor: &'a A,
    today: NaiveDate,
}

impl<'a, A: SequenceAccessor + ?Sized> TaskTimeline<'a, A> {
    /// Resolves the owning chain and reads today once.
    ///
    /// # Errors
    /// `EngineError::ChainNotFound` if the task's chain is missing.
    pub fn new(task: &'a Task, accessor: &'a A, clock: &impl Clock) -> Result<Self, EngineError> {
        let chain = accessor.chain_of(task)?;
        Ok(Self::with_chain(task, chain, accessor, clock.today()))
    }

    /// Builds a timeline when the caller already holds the chain.
    #[must_use]
    pub fn with_chain(task: &'a Task, chain: Chain, accessor: &'a A, today: NaiveDate) -> Self {
        Self {
            task,
            chain,
            accessor,
            today,
        }
    }

    #[must_use]
    pub fn task(&self) -> &Task {
        self.task
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    fn predecessor(&self) -> Result<Task, EngineError> {
        debug!(
            chain = self.task.chain,
            order = self.task.order,
            "looking up predecessor"
        );
        self.accessor.predecessor(self.task)
    }

    fn finish_date_of(task: &Task) -> Result<NaiveDate, EngineError> {
        task.finish_date
            .ok_or(EngineError::MissingFinishDate { task_id: task.id })
    }

    /// Derives WAIT / WORK / DONE / STOP.
    ///
    /// An explicit DONE or STOP always wins. Otherwise the first task works
    /// once the chain has started, and any later task works only once its
    /// predecessor is *stored* as DONE. A predecessor that is merely derived
    /// as working, or that was stopped, keeps this task waiting.
    ///
    /// # Errors
    /// `EngineError::PredecessorNotFound` on a gap in the ordering.
    pub fn actual_status(&self) -> Result<ActualStatus, EngineError> {
        if let Some(status) = self.task.status.as_override() {
            return Ok(status);
        }
        if self.task.is_first() {
            return Ok(if self.chain.start_date > self.today {
                ActualStatus::Wait
            } else {
                ActualStatus::Work
            });
        }
        let prev = self.predecessor()?;
        Ok(if prev.status == StoredStatus::Done {
            ActualStatus::Work
        } else {
            ActualStatus::Wait
        })
    }

    /// The day work on this task starts, if it can be known.
    ///
    /// A waiting task is forecast to start on its predecessor's deadline, as
    /// long as that deadline is still ahead. Once the predecessor is late the
    /// start is unpredictable (`None`). A task past WAIT started the day after
    /// its predecessor finished.
    ///
    /// # Errors
    /// `EngineError::PredecessorNotFound` on a gap in the ordering, or
    /// `EngineError::MissingFinishDate` if a started task's predecessor was
    /// never finished.
    pub fn start_date(&self) -> Result<Option<NaiveDate>, EngineError> {
        if self.task.is_first() {
            return Ok(Some(self.chain.start_date));
        }
        let prev = self.predecessor()?;
        if self.actual_status()? == ActualStatus::Wait {
            return Ok((prev.deadline > self.today).then_some(prev.deadline));
        }
        Ok(Some(next_day(Self::finish_date_of(&prev)?)))
    }

    /// Days allotted to this task by the plan, independent of progress.
    ///
    /// # Errors
    /// `EngineError::PredecessorNotFound` on a gap in the ordering.
    pub fn duration(&self) -> Result<i64, EngineError> {
        let begin = if self.task.is_first() {
            self.chain.start_date
        } else {
            self.predecessor()?.deadline
        };
        Ok(days_between(begin, self.task.deadline))
    }

    /// Full days left before the deadline. Today does not count.
    ///
    /// A task limited to [26; 29) looked at on the 27th has one day left.
    #[must_use]
    pub fn remaining_days(&self) -> Option<i64> {
        (self.today < self.task.deadline).then(|| days_between(self.today, self.task.deadline) - 1)
    }

    /// Days past the deadline, both ends inclusive.
    ///
    /// Finished tasks are measured at their finish date, everything else at
    /// today.
    ///
    /// # Errors
    /// `EngineError::PredecessorNotFound` on a gap in the ordering, or
    /// `EngineError::MissingFinishDate` for a DONE task without a finish date.
    pub fn days_quantity_after_deadline(&self) -> Result<Option<i64>, EngineError> {
        let reference = if self.actual_status()? == ActualStatus::Done {
            Self::finish_date_of(self.task)?
        } else {
            self.today
        };
        Ok((reference >= self.task.deadline)
            .then(|| days_between(self.task.deadline, reference) + 1))
    }

    /// Days actually spent, both ends inclusive. `None` for stopped tasks.
    ///
    /// # Errors
    /// Same as [`Self::start_date`], plus `EngineError::MissingFinishDate`
    /// for a DONE task without a finish date.
    pub fn expended_days(&self) -> Result<Option<i64>, EngineError> {
        let end = match self.actual_status()? {
            ActualStatus::Wait => return Ok(Some(0)),
            ActualStatus::Stop => return Ok(None),
            ActualStatus::Work => self.today,
            ActualStatus::Done => Self::finish_date_of(self.task)?,
        };
        let Some(start) = self.start_date()? else {
            return Ok(None);
        };
        Ok(Some(days_between(start, end) + 1))
    }

    /// Full days left before the task starts. Today does not count.
    ///
    /// # Errors
    /// Same as [`Self::start_date`].
    pub fn days_to_start(&self) -> Result<Option<i64>, EngineError> {
        Ok(self
            .start_date()?
            .filter(|start| *start > self.today)
            .map(|start| days_between(self.today, start) - 1))
    }

    /// True unless the task is overdue.
    ///
    /// # Errors
    /// Same as [`Self::days_quantity_after_deadline`].
    pub fn be_in_time(&self) -> Result<bool, EngineError> {
        Ok(self.days_quantity_after_deadline()?.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::super::clock::FixedClock;
    use super::super::memory::testing::*;
    use super::super::memory::ChainArena;
    use super::*;

    fn arena(start: NaiveDate, tasks: Vec<Task>) -> ChainArena {
        let mut arena = ChainArena::new();
        arena.insert(make_chain(start), tasks).unwrap();
        arena
    }

    fn timeline<'a>(arena: &'a ChainArena, task: &'a Task) -> TaskTimeline<'a, ChainArena> {
        TaskTimeline::new(task, arena, &FixedClock(today())).unwrap()
    }

    /// The chain starts tomorrow, one task due three days later.
    #[test]
    fn test_first_task_waits_for_chain_start() {
        let start = plus(today(), 1);
        let task = make_task(1, plus(start, 3));
        let arena = arena(start, vec![task.clone()]);
        let tl = timeline(&arena, &task);

        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Wait);
        assert_eq!(tl.start_date().unwrap(), Some(start));
        assert_eq!(tl.duration().unwrap(), 3);
        assert_eq!(tl.expended_days().unwrap(), Some(0));
        assert_eq!(tl.days_to_start().unwrap(), Some(0));
    }

    #[test]
    fn test_first_task_works_once_chain_started() {
        let start = minus(today(), 1);
        let task = make_task(1, plus(start, 3));
        let arena = arena(start, vec![task.clone()]);
        let tl = timeline(&arena, &task);

        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Work);
        assert_eq!(tl.expended_days().unwrap(), Some(2));
        assert_eq!(tl.remaining_days().unwrap(), 1);
        assert_eq!(tl.days_to_start().unwrap(), None);
        assert!(tl.be_in_time().unwrap());
    }

    #[test]
    fn test_chain_starting_today_is_working() {
        let task = make_task(1, plus(today(), 2));
        let arena = arena(today(), vec![task.clone()]);
        assert_eq!(timeline(&arena, &task).actual_status().unwrap(), ActualStatus::Work);
    }

    #[test]
    fn test_first_task_start_ignores_status() {
        let start = minus(today(), 4);
        for task in [
            make_task(1, plus(start, 3)),
            done(make_task(1, plus(start, 3)), today()),
            stopped(make_task(1, plus(start, 3))),
        ] {
            let arena = arena(start, vec![task.clone()]);
            assert_eq!(timeline(&arena, &task).start_date().unwrap(), Some(start));
        }
    }

    #[test]
    fn test_successor_waits_while_predecessor_works() {
        let start = minus(today(), 1);
        let first = make_task(1, plus(start, 3));
        let second = make_task(2, plus(first.deadline, 2));
        let arena = arena(start, vec![first.clone(), second.clone()]);
        let tl = timeline(&arena, &second);

        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Wait);
        assert_eq!(tl.start_date().unwrap(), Some(first.deadline));
        assert_eq!(tl.duration().unwrap(), 2);
        assert_eq!(tl.days_to_start().unwrap(), Some(1));
    }

    /// The predecessor delivered today, a day ahead of schedule.
    #[test]
    fn test_early_completion_propagates() {
        let start = minus(today(), 2);
        let first = done(make_task(1, plus(start, 3)), today());
        let second = make_task(2, plus(first.deadline, 2));
        let arena = arena(start, vec![first.clone(), second.clone()]);
        let tl = timeline(&arena, &second);

        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Work);
        assert_eq!(tl.start_date().unwrap(), Some(plus(today(), 1)));
        assert_eq!(tl.days_to_start().unwrap(), Some(0));
        assert_eq!(tl.expended_days().unwrap(), Some(0));
    }

    /// The predecessor blew its deadline, so no start can be forecast.
    #[test]
    fn test_late_predecessor_makes_start_unpredictable() {
        let start = minus(today(), 10);
        let first = make_task(1, plus(start, 3));
        let second = make_task(2, plus(first.deadline, 2));
        let arena = arena(start, vec![first.clone(), second.clone()]);
        let tl = timeline(&arena, &second);

        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Wait);
        assert_eq!(tl.start_date().unwrap(), None);
        assert_eq!(tl.days_to_start().unwrap(), None);
        assert_eq!(tl.days_quantity_after_deadline().unwrap(), Some(6));
        assert!(!tl.be_in_time().unwrap());
    }

    #[test]
    fn test_stopped_predecessor_keeps_successor_waiting() {
        let start = minus(today(), 1);
        let first = stopped(make_task(1, plus(start, 3)));
        let second = make_task(2, plus(first.deadline, 2));
        let arena = arena(start, vec![first, second.clone()]);
        assert_eq!(timeline(&arena, &second).actual_status().unwrap(), ActualStatus::Wait);
    }

    #[test]
    fn test_explicit_override_wins() {
        let start = plus(today(), 5);
        let first = stopped(make_task(1, plus(start, 3)));
        let arena = arena(start, vec![first.clone()]);
        let tl = timeline(&arena, &first);
        assert_eq!(tl.actual_status().unwrap(), ActualStatus::Stop);
        assert_eq!(tl.expended_days().unwrap(), None);
    }

    #[test]
    fn test_deadline_today_is_overdue_by_one() {
        let task = make_task(1, today());
        let arena = arena(minus(today(), 3), vec![task.clone()]);
        let tl = timeline(&arena, &task);
        assert_eq!(tl.remaining_days(), None);
        assert_eq!(tl.days_quantity_after_deadline().unwrap(), Some(1));
    }

    #[test]
    fn test_done_measured_at_finish_date() {
        let start = minus(today(), 10);
        let on_time = done(make_task(1, plus(start, 5)), plus(start, 4));
        let arena_a = arena(start, vec![on_time.clone()]);
        let tl = timeline(&arena_a, &on_time);
        assert_eq!(tl.days_quantity_after_deadline().unwrap(), None);
        assert_eq!(tl.expended_days().unwrap(), Some(5));

        let late = done(make_task(1, plus(start, 5)), plus(start, 7));
        let arena_b = arena(start, vec![late.clone()]);
        let tl = timeline(&arena_b, &late);
        assert_eq!(tl.days_quantity_after_deadline().unwrap(), Some(3));
        assert_eq!(tl.expended_days().unwrap(), Some(8));
    }

    #[test]
    fn test_same_day_delivery_expends_one_day() {
        let start = minus(today(), 5);
        let first = done(make_task(1, plus(start, 2)), plus(start, 1));
        let second = done(make_task(2, plus(start, 4)), plus(start, 2));
        let arena = arena(start, vec![first, second.clone()]);
        let tl = timeline(&arena, &second);
        assert_eq!(tl.start_date().unwrap(), Some(plus(start, 2)));
        assert_eq!(tl.expended_days().unwrap(), Some(1));
    }

    #[test]
    fn test_gap_in_chain_is_not_found() {
        let start = minus(today(), 1);
        let first = make_task(1, plus(start, 3));
        let arena = arena(start, vec![first]);
        let orphan = make_task(3, plus(start, 9));
        let tl = timeline(&arena, &orphan);
        assert!(matches!(
            tl.actual_status(),
            Err(EngineError::PredecessorNotFound { order: 2, .. })
        ));
    }

    #[test]
    fn test_started_task_after_unfinished_predecessor_is_caller_error() {
        let start = minus(today(), 1);
        let first = make_task(1, plus(start, 3));
        let second = stopped(make_task(2, plus(start, 5)));
        let arena = arena(start, vec![first, second.clone()]);
        assert!(matches!(
            timeline(&arena, &second).start_date(),
            Err(EngineError::MissingFinishDate { task_id: 10 })
        ));
    }

    #[test]
    fn test_derivations_are_idempotent() {
        let start = minus(today(), 2);
        let first = done(make_task(1, plus(start, 3)), today());
        let second = make_task(2, plus(first.deadline, 2));
        let arena = arena(start, vec![first, second.clone()]);
        let tl = timeline(&arena, &second);
        assert_eq!(tl.actual_status().unwrap(), tl.actual_status().unwrap());
        assert_eq!(tl.start_date().unwrap(), tl.start_date().unwrap());
        assert_eq!(tl.expended_days().unwrap(), tl.expended_days().unwrap());
        assert_eq!(tl.remaining_days(), tl.remaining_days());
    }

    #[test]
    fn test_missing_chain() {
        let arena = ChainArena::new();
        let task = make_task(1, today());
        assert!(matches!(
            TaskTimeline::new(&task, &arena, &FixedClock(today())),
            Err(EngineError::ChainNotFound { chain_id: CHAIN_ID })
        ));
    }
}
