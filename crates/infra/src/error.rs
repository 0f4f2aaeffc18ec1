//! Store error model and sqlx error mapping.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | Kind | StoreError | Scenario |
//! |------------|------|------------|----------|
//! | Database | check violation | `Domain(Validation)` | A row would break a table CHECK (e.g. negative stock) |
//! | Database | any other | `Backend` | Unique/foreign key/other database failures |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | RowNotFound | N/A | `Domain(NotFound)` | `fetch_one` on a missing row |
//! | Other | N/A | `Backend` | IO errors, connection failures, decode errors, etc. |

use thiserror::Error;

use stockroom_core::DomainError;

/// Product store operation error.
///
/// Domain failures (validation, missing records, stock rules) pass through
/// unchanged; everything else is a backend failure the caller cannot fix.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Domain(DomainError::NotFound))
    }
}

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.kind() {
                sqlx::error::ErrorKind::CheckViolation => {
                    StoreError::Domain(DomainError::validation("product", msg))
                }
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => StoreError::Domain(DomainError::NotFound),
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
