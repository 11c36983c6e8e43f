//! Indexed message table.
//!
//! Two indexes over the same `Arc<Message>` records:
//! - `by_id`: unique primary index
//! - `by_time`: ordered secondary index keyed by `(time, id)`, so equal
//!   timestamps have a fixed order
//!
//! Both are persistent maps: cloning a table shares structure with the
//! original and each upsert copies only the path it touches.

use std::ops::Bound;
use std::sync::Arc;

use imbl::ordmap::Iter as RangedIter;
use imbl::{HashMap, OrdMap};

use crate::error::{Error, Result};
use crate::message::Message;

type TimeKey = (i64, String);

#[derive(Debug, Clone, Default)]
pub(crate) struct Table {
    by_id: HashMap<String, Arc<Message>>,
    by_time: OrdMap<TimeKey, Arc<Message>>,
}

impl Table {
    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn get(&self, id: &str) -> Option<&Message> {
        self.by_id.get(id).map(Arc::as_ref)
    }

    /// Insert or replace the record with `message.id`.
    ///
    /// On error the table is left untouched.
    pub(crate) fn upsert(&mut self, message: Message) -> Result<()> {
        if message.id.is_empty() {
            return Err(Error::MissingPrimaryKey);
        }

        if let Some(prev_time) = self.by_id.get(&message.id).map(|prev| prev.time) {
            self.by_time
                .remove(&(prev_time, message.id.clone()))
                .ok_or(Error::Index("time index missing indexed record"))?;
        }

        let record = Arc::new(message);
        self.by_time
            .insert((record.time, record.id.clone()), Arc::clone(&record));
        self.by_id.insert(record.id.clone(), record);
        Ok(())
    }

    /// Records with `start <= time <= end` in time order.
    pub(crate) fn range(&self, start: i64, end: i64) -> TimeRange<'_> {
        let inner = (start <= end).then(|| {
            let lower = Bound::Included((start, String::new()));
            let upper = match end.checked_add(1) {
                Some(next) => Bound::Excluded((next, String::new())),
                None => Bound::Unbounded,
            };
            self.by_time.range((lower, upper))
        });
        TimeRange { inner }
    }
}

/// Ordered iterator over a time range of a snapshot.
///
/// Iterates ascending by `(time, id)`; use `.rev()` for descending.
pub struct TimeRange<'a> {
    inner: Option<RangedIter<'a, TimeKey, Arc<Message>>>,
}

impl<'a> Iterator for TimeRange<'a> {
    type Item = &'a Message;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, record) = self.inner.as_mut()?.next()?;
        Some(record.as_ref())
    }
}

impl<'a> DoubleEndedIterator for TimeRange<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (_, record) = self.inner.as_mut()?.next_back()?;
        Some(record.as_ref())
    }
}
