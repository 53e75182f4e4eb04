//! Database access
//!
//! Queries are plain functions over any Postgres executor, so handlers can
//! run them against the pool or inside a transaction (`&mut *tx`).

pub mod bookings;
pub mod pitches;
mod pool;
pub mod results;
pub mod seasons;
pub mod teams;
pub mod tokens;

pub use pool::{create_pool, run_migrations};

use crate::engine::EngineError;
use crate::error::AppError;

/// Map a unique-constraint violation to a conflict with `message`
pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            EngineError::conflict(message).into()
        }
        _ => err.into(),
    }
}
