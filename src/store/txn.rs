use std::sync::{Arc, MutexGuard};

use crate::error::Result;
use crate::message::Message;
use crate::store::table::Table;
use crate::store::MessageStore;

/// Exclusive write transaction.
///
/// Holds the store's writer lock for its whole life and stages changes on a
/// private copy of the table. The copy shares structure with the published
/// snapshot, so opening a transaction is O(1) and each staged insert is
/// O(log n). `commit` publishes the copy as the new snapshot; `abort` or
/// dropping the transaction discards it.
///
/// Do not call other write operations on the same store from the thread that
/// holds an open transaction: the writer lock is not reentrant.
pub struct WriteTxn<'a> {
    store: &'a MessageStore,
    staged: Table,
    _writer: MutexGuard<'a, ()>,
}

impl<'a> WriteTxn<'a> {
    pub(crate) fn open(store: &'a MessageStore, writer: MutexGuard<'a, ()>) -> Self {
        let staged = store.current().as_ref().clone();
        Self {
            store,
            staged,
            _writer: writer,
        }
    }

    /// Stage an insert-or-replace. A failed insert leaves the staged state as
    /// it was.
    pub fn insert(&mut self, message: Message) -> Result<()> {
        self.staged.upsert(message)
    }

    /// Staged view of a record, including uncommitted writes.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.staged.get(id)
    }

    /// Number of records the table would hold after commit.
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.len() == 0
    }

    pub fn commit(self) {
        self.store.publish(Arc::new(self.staged));
    }

    pub fn abort(self) {}
}
