//! Storage error model and SQLx error mapping.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (check constraint violation) | `23514` | `Constraint` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed | N/A | `Storage` |
//! | RowNotFound | N/A | `NotFound` |
//! | Other | N/A | `Storage` |

use thiserror::Error;
use tokio::runtime::RuntimeFlavor;

/// Persistence-layer failure.
///
/// These are infrastructure errors and reach callers unchanged; they are never
/// folded into the validation error kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A database constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    /// Synchronous store used outside of a tokio runtime.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        Self::Storage("lock poisoned".to_string())
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") | Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(format!("no row in {operation}")),
        _ => StoreError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

/// Run `fut` to completion from synchronous code on the current tokio runtime.
///
/// Requires a multi-threaded runtime (`block_in_place`); any other runtime
/// flavor yields `StoreError::Runtime` instead of blocking.
pub(crate) fn block_on<F, T>(operation: &str, fut: F) -> Result<T, StoreError>
where
    F: std::future::Future<Output = Result<T, StoreError>>,
{
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Runtime(format!(
            "{operation} requires a tokio runtime; call it from within a runtime context"
        ))
    })?;

    if !matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) {
        return Err(StoreError::Runtime(format!(
            "{operation} requires a multi-threaded tokio runtime"
        )));
    }

    tokio::task::block_in_place(|| handle.block_on(fut))
}
