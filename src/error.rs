use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Carries the name of the missing entity.
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The query cannot be served by a partition or index lookup and the
    /// caller did not opt into a full scan.
    #[error("query on {table} requires allow_filtering: {reason}")]
    FilteringRequired { table: &'static str, reason: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("cannot decode column {column}: {reason}")]
    Decode { column: String, reason: String },

    #[error("store connection is closed")]
    Closed,

    #[error("background task failed: {0}")]
    Task(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn decode(column: &str, reason: impl std::fmt::Display) -> Self {
        Self::Decode {
            column: column.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
