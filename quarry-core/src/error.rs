//! Error types for Quarry

use crate::builder::QueryKind;
use thiserror::Error;

/// Boxed driver error carried by [`Error::StatementExecutionFailed`]
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for Quarry operations
#[derive(Error, Debug)]
pub enum Error {
    /// A value has no statement parameter kind. Always a programming error.
    #[error("Unsupported bind type: {type_name}")]
    UnsupportedBindType { type_name: &'static str },

    /// UPDATE or DELETE compiled without any WHERE condition
    #[error("Refusing to compile {kind} without a WHERE condition")]
    DangerousUnconditionedMutation { kind: QueryKind },

    /// Prepare or execute failed in the underlying driver
    #[error("Statement execution failed: {source}")]
    StatementExecutionFailed {
        #[source]
        source: DriverError,
    },

    /// Delete requested for an entity that has no identity yet
    #[error("Cannot delete an unsaved entity from table '{table}'")]
    CannotDeleteUnsavedEntity { table: &'static str },

    /// The connection reported no generated identity after an insert
    #[error("No generated identity returned after inserting into '{table}'")]
    MissingGeneratedId { table: &'static str },

    /// Invalid query configuration
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    /// A row could not be mapped onto the requested type
    #[error("Hydration error: {0}")]
    Hydration(#[from] serde_json::Error),

    /// Connection configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Convenience Result type for Quarry operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap any driver error as a statement execution failure
    pub fn execution(source: impl Into<DriverError>) -> Self {
        Self::StatementExecutionFailed {
            source: source.into(),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::execution(err)
    }
}
