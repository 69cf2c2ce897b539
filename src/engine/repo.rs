//! Record store: SQLite repositories and the accessor the engine reads through.

mod chains;
mod tasks;

pub use chains::{row_to_chain, ChainRepo, NewChain, CHAIN_SELECT};
pub use tasks::{row_to_task, NewTask, TaskRepo, TASK_SELECT};

use super::error::EngineError;
use super::sequence::SequenceAccessor;
use super::types::{Chain, StoredStatus, Task};
use rusqlite::Connection;
use tracing::debug;

/// Answers the engine's lookups straight from the database.
///
/// Holds no cache: every predecessor lookup is a fresh query by
/// `(chain_id, ord)`.
pub struct Store<'a> {
    conn: &'a Connection,
}

impl<'a> Store<'a> {
    #[must_use]
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub fn tasks(&self) -> TaskRepo<'a> {
        TaskRepo::new(self.conn)
    }

    #[must_use]
    pub fn chains(&self) -> ChainRepo<'a> {
        ChainRepo::new(self.conn)
    }
}

impl SequenceAccessor for Store<'_> {
    fn chain_of(&self, task: &Task) -> Result<Chain, EngineError> {
        self.chains()
            .find_by_id(task.chain)?
            .ok_or(EngineError::ChainNotFound { chain_id: task.chain })
    }

    fn predecessor(&self, task: &Task) -> Result<Task, EngineError> {
        let order = task.order.saturating_sub(1);
        debug!(chain = task.chain, order, "querying predecessor");
        self.tasks()
            .find_by_order(task.chain, order)?
            .ok_or(EngineError::PredecessorNotFound {
                chain_id: task.chain,
                order,
            })
    }

    fn last_task(&self, chain: &Chain) -> Result<Task, EngineError> {
        self.tasks()
            .find_last(chain.id)?
            .ok_or(EngineError::EmptyChain { chain_id: chain.id })
    }

    fn tasks_with_status(
        &self,
        chain: &Chain,
        status: StoredStatus,
    ) -> Result<Vec<Task>, EngineError> {
        Ok(self.tasks().with_status(chain.id, status)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::db::Db;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn seed(conn: &Connection) -> i64 {
        let chain_id = ChainRepo::new(conn)
            .add(&NewChain {
                name: "Site",
                start_date: date(1),
                priority: 2,
                owner: "alexander",
                archive: false,
            })
            .unwrap();
        let repo = TaskRepo::new(conn);
        for (order, worker, deadline, status) in [
            (1, "kazimir", date(6), StoredStatus::Done),
            (2, "andy", date(8), StoredStatus::Stop),
            (3, "ada", date(12), StoredStatus::Uncertain),
        ] {
            repo.add(&NewTask {
                chain: chain_id,
                order,
                worker,
                task: "work",
                deadline,
                finish_date: (status == StoredStatus::Done).then_some(date(5)),
                status,
                archive: false,
            })
            .unwrap();
        }
        chain_id
    }

    #[test]
    fn test_store_answers_sequence_lookups() {
        let conn = Db::open_in_memory().unwrap();
        let chain_id = seed(&conn);
        let store = Store::new(&conn);
        let chain = store.chains().find_by_id(chain_id).unwrap().unwrap();

        let last = store.last_task(&chain).unwrap();
        assert_eq!(last.order, 3);
        assert_eq!(store.chain_of(&last).unwrap(), chain);

        let prev = store.predecessor(&last).unwrap();
        assert_eq!(prev.worker, "andy");
        assert_eq!(prev.status, StoredStatus::Stop);

        let first = store.predecessor(&prev).unwrap();
        assert_eq!(first.finish_date, Some(date(5)));

        let stopped = store.tasks_with_status(&chain, StoredStatus::Stop).unwrap();
        assert_eq!(stopped.len(), 1);
    }

    #[test]
    fn test_store_reports_missing_records() {
        let conn = Db::open_in_memory().unwrap();
        let chain_id = seed(&conn);
        let store = Store::new(&conn);
        let first = store.tasks().find_by_order(chain_id, 1).unwrap().unwrap();
        assert!(matches!(
            store.predecessor(&first),
            Err(EngineError::PredecessorNotFound { order: 0, .. })
        ));

        let empty = ChainRepo::new(&conn)
            .add(&NewChain {
                name: "Empty",
                start_date: date(1),
                priority: 0,
                owner: "alexander",
                archive: false,
            })
            .unwrap();
        let empty = store.chains().find_by_id(empty).unwrap().unwrap();
        assert!(matches!(
            store.last_task(&empty),
            Err(EngineError::EmptyChain { .. })
        ));
    }

    #[test]
    fn test_duplicate_order_rejected_by_schema() {
        let conn = Db::open_in_memory().unwrap();
        let chain_id = seed(&conn);
        let result = TaskRepo::new(&conn).add(&NewTask {
            chain: chain_id,
            order: 2,
            worker: "homer",
            task: "Content",
            deadline: date(20),
            finish_date: None,
            status: StoredStatus::Uncertain,
            archive: false,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_worker_lists_split_by_archive() {
        let conn = Db::open_in_memory().unwrap();
        let chain_id = seed(&conn);
        let repo = TaskRepo::new(&conn);
        repo.add(&NewTask {
            chain: chain_id,
            order: 4,
            worker: "ada",
            task: "Old",
            deadline: date(2),
            finish_date: None,
            status: StoredStatus::Uncertain,
            archive: true,
        })
        .unwrap();

        let actual = repo.actual_by_worker("ada").unwrap();
        assert_eq!(actual.len(), 1);
        assert_eq!(actual[0].order, 3);
        let archived = repo.archived_by_worker("ada").unwrap();
        assert_eq!(archived.len(), 1);
        assert!(archived[0].archive);
        assert_eq!(repo.by_chain(chain_id).unwrap().len(), 4);
    }
}
