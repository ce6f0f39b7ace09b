//! Shared plumbing for the favorite, shopping-cart and subscription toggles.
//!
//! Every toggle row has a composite primary key, so adding is one insert that
//! either lands or trips the key, and removing is one `DELETE ... WHERE` whose
//! affected-row count tells whether anything was there.

use sea_orm::{DbErr, DeleteResult, SqlErr};

use crate::error::AppError;

/// Map an insert failure on a toggle row to an API error.
///
/// A duplicate key means the pair already exists. A foreign key failure means
/// the target vanished between lookup and insert.
pub fn map_insert_err(err: DbErr, duplicate: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Toggle insert lost to an existing row");
            AppError::Conflict(duplicate.into())
        }
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::NotFound("Target no longer exists".into())
        }
        _ => AppError::from(err),
    }
}

/// Turn the result of a toggle delete into `Ok` or `NotFound`.
pub fn expect_removed(result: DeleteResult, missing: &str) -> Result<(), AppError> {
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(missing.into()));
    }
    Ok(())
}
