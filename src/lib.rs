//! In-memory indexed message store.
//!
//! Messages are kept in a table with a unique index on `id` and an ordered
//! index on `time`. Writes are transactional upserts; reads run against
//! immutable snapshots and never observe a half-applied write.
//!
//! Optional layers on top of the store:
//! - `import`: CSV bulk loader (feature `import`)
//! - `http`: axum service with public submission and basic-auth admin
//!   endpoints (feature `server`)

pub mod config;
pub mod error;
pub mod message;
pub mod query;
pub mod store;

#[cfg(feature = "server")]
pub mod http;
#[cfg(feature = "import")]
pub mod import;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use message::{format_timestamp, parse_timestamp, Message, MessageError};
pub use query::Order;
pub use store::{MessageStore, Snapshot, TimeRange, WriteTxn};
