//! Repository error types
//!
//! Failures are classified so callers can react without string matching:
//! query-build problems fail fast before any I/O, store failures carry the
//! table and operation they occurred in, and singular fetches that match
//! zero rows are distinguishable from genuine store errors.

use std::fmt;

use super::entity::EncodeError;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Operation being performed when a repository error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Finding multiple entities with filters
    Find,
    /// Finding a single entity
    FindOne,
    /// Counting entities matching filters
    Count,
    /// Creating a new entity
    Create,
    /// Updating an existing entity
    Update,
    /// Inserting or updating on a conflict key
    Upsert,
    /// Deleting an entity by id
    Delete,
    /// Deleting all entities matching filters
    DeleteMany,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Find => write!(f, "find"),
            Self::FindOne => write!(f, "find_one"),
            Self::Count => write!(f, "count"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Upsert => write!(f, "upsert"),
            Self::Delete => write!(f, "delete"),
            Self::DeleteMany => write!(f, "delete_many"),
        }
    }
}

/// Error returned by repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Malformed filter shape or empty column set; raised before any I/O
    #[error("query build failed: {0}")]
    QueryBuild(String),

    /// Store-level failure, wrapped with operation context
    #[error("{operation} failed on \"{table}\": {source}")]
    Execution {
        /// The operation being executed
        operation: Operation,
        /// Table the statement targeted
        table: String,
        /// Underlying sqlx error
        #[source]
        source: sqlx::Error,
    },

    /// Zero-row result on a singular fetch, update, or delete
    #[error("no row in \"{table}\" matching id {id}")]
    NotFound {
        /// Table the lookup targeted
        table: String,
        /// The identifier that matched nothing
        id: String,
    },

    /// Input rejected before any store call was issued
    #[error("validation failed: {0}")]
    Validation(String),

    /// Composite column value failed to serialize
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Failed to open a transaction
    #[error("failed to begin transaction: {0}")]
    TransactionBegin(#[source] sqlx::Error),

    /// Failed to commit a transaction
    #[error("failed to commit transaction: {0}")]
    TransactionCommit(#[source] sqlx::Error),

    /// Unit of work failed and the subsequent rollback failed too; both
    /// errors are preserved
    #[error("transaction failed: {source}; rollback also failed: {rollback}")]
    TransactionRollback {
        /// The error that aborted the unit of work
        #[source]
        source: Box<RepositoryError>,
        /// The rollback failure
        rollback: sqlx::Error,
    },
}

impl RepositoryError {
    /// Wrap a store failure with the operation and table it occurred in.
    pub fn execution(operation: Operation, table: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Execution {
            operation,
            table: table.into(),
            source,
        }
    }

    /// A singular fetch, update, or delete matched zero rows.
    pub fn not_found(table: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            table: table.into(),
            id: id.to_string(),
        }
    }
}
