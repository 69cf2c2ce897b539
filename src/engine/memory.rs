//! In-memory arena of chains and their tasks.
//!
//! Tasks are keyed by `(chain id, order)`, so the predecessor of a task is a
//! key lookup rather than a stored link.

use super::error::EngineError;
use super::sequence::{check_ordering, SequenceAccessor};
use super::types::{Chain, StoredStatus, Task, FIRST_TASK};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
pub struct ChainArena {
    chains: HashMap<i64, Chain>,
    tasks: BTreeMap<(i64, u32), Task>,
}

impl ChainArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a chain together with its complete task sequence.
    ///
    /// # Errors
    /// Rejects a task owned by another chain, a malformed task record, or an
    /// ordering that is not exactly `1..=N`.
    pub fn insert(&mut self, chain: Chain, tasks: Vec<Task>) -> Result<(), EngineError> {
        for task in &tasks {
            if task.chain != chain.id {
                return Err(EngineError::InvalidRecord {
                    task_id: task.id,
                    reason: format!("belongs to chain {}, not {}", task.chain, chain.id),
                });
            }
            task.validate()?;
        }
        check_ordering(chain.id, tasks.iter().map(|t| t.order))?;

        self.tasks.retain(|(chain_id, _), _| *chain_id != chain.id);
        for task in tasks {
            self.tasks.insert((task.chain, task.order), task);
        }
        self.chains.insert(chain.id, chain);
        Ok(())
    }

    #[must_use]
    pub fn chain(&self, id: i64) -> Option<&Chain> {
        self.chains.get(&id)
    }

    #[must_use]
    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.values().find(|t| t.id == id)
    }

    /// Tasks of a chain in order.
    pub fn tasks_of(&self, chain_id: i64) -> impl Iterator<Item = &Task> {
        self.tasks
            .range((chain_id, FIRST_TASK)..=(chain_id, u32::MAX))
            .map(|(_, task)| task)
    }
}

impl SequenceAccessor for ChainArena {
    fn chain_of(&self, task: &Task) -> Result<Chain, EngineError> {
        self.chains
            .get(&task.chain)
            .cloned()
            .ok_or(EngineError::ChainNotFound { chain_id: task.chain })
    }

    fn predecessor(&self, task: &Task) -> Result<Task, EngineError> {
        let order = task.order.saturating_sub(1);
        self.tasks
            .get(&(task.chain, order))
            .cloned()
            .ok_or(EngineError::PredecessorNotFound {
                chain_id: task.chain,
                order,
            })
    }

    fn last_task(&self, chain: &Chain) -> Result<Task, EngineError> {
        self.tasks_of(chain.id)
            .last()
            .cloned()
            .ok_or(EngineError::EmptyChain { chain_id: chain.id })
    }

    fn tasks_with_status(
        &self,
        chain: &Chain,
        status: StoredStatus,
    ) -> Result<Vec<Task>, EngineError> {
        Ok(self
            .tasks_of(chain.id)
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }
}
