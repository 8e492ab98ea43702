pub mod customer;
pub mod document;
pub mod employee;
pub mod product;
pub mod receipt;
pub mod report;
pub mod user;

use sqlx::Error as SqlxError;

use crate::error::AppError;

/// Maps a Postgres unique violation (23505) to a conflict with a targeted
/// message; everything else stays a database error.
pub fn map_unique_violation(err: SqlxError, message: &str) -> AppError {
    match err {
        SqlxError::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AppError::conflict(message)
        }
        other => other.into(),
    }
}
