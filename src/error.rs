use thiserror::Error;

/// Errors returned by the message store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No record exists for the requested id.
    #[error("message not found: {0}")]
    NotFound(String),
    /// The record has no value for the unique id index.
    #[error("message has no id")]
    MissingPrimaryKey,
    /// The primary and time indexes disagree.
    #[error("corrupt index: {0}")]
    Index(&'static str),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
