//! Transactional Services
//!
//! Operations that must be atomic across tables: opening a contest (gold
//! charge + ledger insert) and settling a tile (history append + ownership
//! update). Each runs inside a single SQLite transaction.

pub mod contest_service;
pub mod settlement_service;

pub use contest_service::ContestService;
pub use settlement_service::SettlementService;

use crate::error::StoreError;

/// Map a unique-constraint violation to a typed business error, passing
/// every other database failure through unchanged.
pub(crate) fn map_unique_violation(err: rusqlite::Error, to: StoreError) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            to
        }
        _ => StoreError::Sqlite(err),
    }
}
