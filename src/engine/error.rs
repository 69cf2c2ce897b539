//! Errors raised by the derivation engine and its accessors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("chain {chain_id} not found")]
    ChainNotFound { chain_id: i64 },

    /// The chain has a gap where the predecessor should be.
    #[error("task with order {order} not found in chain {chain_id}")]
    PredecessorNotFound { chain_id: i64, order: u32 },

    #[error("chain {chain_id} has no tasks")]
    EmptyChain { chain_id: i64 },

    #[error("task {task_id} has no finish date")]
    MissingFinishDate { task_id: i64 },

    #[error("chain {chain_id} has broken ordering: {reason}")]
    InvalidOrdering { chain_id: i64, reason: String },

    #[error("task {task_id} is malformed: {reason}")]
    InvalidRecord { task_id: i64, reason: String },

    #[error("record store failure: {0}")]
    Store(#[from] rusqlite::Error),
}
