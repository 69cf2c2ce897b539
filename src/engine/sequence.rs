//! Sequence Accessor: how the engine reaches related records.
//!
//! The engine never holds links between tasks. Every lookup goes back to the
//! accessor by `(chain, order)` key.

use super::error::EngineError;
use super::types::{Chain, StoredStatus, Task, FIRST_TASK};

pub trait SequenceAccessor {
    /// Returns the chain that owns `task`.
    ///
    /// # Errors
    /// `EngineError::ChainNotFound` if the chain record is missing.
    fn chain_of(&self, task: &Task) -> Result<Chain, EngineError>;

    /// Returns the task with `order - 1` in the same chain.
    ///
    /// # Errors
    /// `EngineError::PredecessorNotFound` if the ordering has a gap, or if
    /// called for the first task.
    fn predecessor(&self, task: &Task) -> Result<Task, EngineError>;

    /// Returns the task with the highest order in `chain`.
    ///
    /// # Errors
    /// `EngineError::EmptyChain` if the chain has no tasks.
    fn last_task(&self, chain: &Chain) -> Result<Task, EngineError>;

    /// Returns the tasks of `chain` whose stored status equals `status`.
    ///
    /// # Errors
    /// Only store failures.
    fn tasks_with_status(&self, chain: &Chain, status: StoredStatus)
        -> Result<Vec<Task>, EngineError>;
}

impl<A: SequenceAccessor + ?Sized> SequenceAccessor for &A {
    fn chain_of(&self, task: &Task) -> Result<Chain, EngineError> {
        (**self).chain_of(task)
    }

    fn predecessor(&self, task: &Task) -> Result<Task, EngineError> {
        (**self).predecessor(task)
    }

    fn last_task(&self, chain: &Chain) -> Result<Task, EngineError> {
        (**self).last_task(chain)
    }

    fn tasks_with_status(
        &self,
        chain: &Chain,
        status: StoredStatus,
    ) -> Result<Vec<Task>, EngineError> {
        (**self).tasks_with_status(chain, status)
    }
}

/// Checks that `orders` is exactly `1..=N` with no gaps or duplicates.
///
/// # Errors
/// `EngineError::InvalidOrdering` naming the first offending position.
pub fn check_ordering(
    chain_id: i64,
    orders: impl IntoIterator<Item = u32>,
) -> Result<(), EngineError> {
    match ordering_defect(orders) {
        Some(reason) => Err(EngineError::InvalidOrdering { chain_id, reason }),
        None => Ok(()),
    }
}

/// Describes the first gap or duplicate in `orders`, if any.
pub fn ordering_defect(orders: impl IntoIterator<Item = u32>) -> Option<String> {
    let mut sorted: Vec<u32> = orders.into_iter().collect();
    sorted.sort_unstable();
    (FIRST_TASK..)
        .zip(sorted)
        .find(|(expected, order)| order != expected)
        .map(|(expected, order)| {
            if order < expected {
                format!("order {order} appears more than once")
            } else {
                format!("order {expected} is missing")
            }
        })
}
