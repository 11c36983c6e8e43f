//! Time-ordered retrieval over the store's time index.

use crate::message::Message;
use crate::store::MessageStore;

/// Direction of a time-ordered fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl From<bool> for Order {
    fn from(ascending: bool) -> Self {
        if ascending {
            Order::Ascending
        } else {
            Order::Descending
        }
    }
}

impl MessageStore {
    /// Messages with `start <= time <= end`, sorted by time.
    ///
    /// Equal timestamps are ordered by id (reversed when descending).
    /// `start > end` yields nothing; `i64::MIN` and `i64::MAX` leave that end
    /// of the range open.
    pub fn fetch_sorted_by_time(&self, start: i64, end: i64, ascending: bool) -> Vec<Message> {
        self.fetch_range(start, end, Order::from(ascending))
    }

    pub fn fetch_range(&self, start: i64, end: i64, order: Order) -> Vec<Message> {
        let snapshot = self.snapshot();
        let range = snapshot.range(start, end);
        match order {
            Order::Ascending => range.cloned().collect(),
            Order::Descending => range.rev().cloned().collect(),
        }
    }

    /// The whole timeline, most recent first.
    pub fn fetch_anti_chrono(&self) -> Vec<Message> {
        self.fetch_range(i64::MIN, i64::MAX, Order::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_from_flag() {
        assert_eq!(Order::from(true), Order::Ascending);
        assert_eq!(Order::from(false), Order::Descending);
    }

    #[test]
    fn anti_chrono_includes_pre_epoch_messages() {
        let store = MessageStore::new();
        store.insert(Message::new("old", "", "", "t", -100, 0)).unwrap();
        store.insert(Message::new("new", "", "", "t", 100, 0)).unwrap();

        let ids: Vec<_> = store.fetch_anti_chrono().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(store.fetch_sorted_by_time(0, i64::MAX, false).len(), 1);
    }
}
