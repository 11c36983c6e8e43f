//! Bulk loaders that feed the message store.

pub mod message_csv;

pub use message_csv::{load_csv, load_csv_reader, ImportStats};
