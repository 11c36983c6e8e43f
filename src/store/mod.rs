//! In-memory indexed message store.
//!
//! Readers take an `Arc` of the current immutable table and never wait for a
//! writer. Writers are serialized by a mutex, build the next table on a
//! structurally shared copy, and publish it with a single pointer swap, so a reader sees
//! either all of a transaction or none of it.
//!
//! ```
//! use missive::{Message, MessageStore};
//!
//! let store = MessageStore::new();
//! store.insert(Message::new("a1", "Ada", "ada@example.com", "hello", 1_500_000_000, 0))?;
//! assert_eq!(store.fetch_by_id("a1")?.name, "Ada");
//! # Ok::<(), missive::Error>(())
//! ```

mod table;
mod txn;

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::error::{Error, Result};
use crate::message::Message;

use self::table::Table;
pub use self::table::TimeRange;
pub use self::txn::WriteTxn;

#[derive(Debug, Default)]
pub struct MessageStore {
    current: RwLock<Arc<Table>>,
    writer: Mutex<()>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a write transaction, waiting for any other writer to finish.
    pub fn write(&self) -> WriteTxn<'_> {
        // A panicking writer never published its staged table, so the guarded
        // state is still consistent.
        let writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        WriteTxn::open(self, writer)
    }

    /// Insert a message, replacing any record with the same id.
    pub fn insert(&self, message: Message) -> Result<()> {
        let mut txn = self.write();
        txn.insert(message)?;
        txn.commit();
        Ok(())
    }

    /// Insert every message in one transaction. On error nothing is applied.
    pub fn insert_batch<I>(&self, messages: I) -> Result<()>
    where
        I: IntoIterator<Item = Message>,
    {
        let mut txn = self.write();
        for message in messages {
            txn.insert(message)?;
        }
        txn.commit();
        Ok(())
    }

    pub fn fetch_by_id(&self, id: &str) -> Result<Message> {
        self.snapshot()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Every record, in time-index order.
    pub fn fetch_all(&self) -> Vec<Message> {
        self.snapshot().iter().cloned().collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Point-in-time view of the store, unaffected by later writes.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            table: self.current(),
        }
    }

    fn current(&self) -> Arc<Table> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn publish(&self, table: Arc<Table>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = table;
    }
}

/// Immutable view of the store at one commit.
#[derive(Debug, Clone)]
pub struct Snapshot {
    table: Arc<Table>,
}

impl Snapshot {
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.table.get(id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Records with `start <= time <= end`, ascending; `.rev()` for descending.
    /// An inverted range is empty.
    pub fn range(&self, start: i64, end: i64) -> TimeRange<'_> {
        self.table.range(start, end)
    }

    /// Records with `time >= start`, ascending.
    pub fn range_from(&self, start: i64) -> TimeRange<'_> {
        self.table.range(start, i64::MAX)
    }

    pub fn iter(&self) -> TimeRange<'_> {
        self.table.range(i64::MIN, i64::MAX)
    }
}
