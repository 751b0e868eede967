//! Store Error Registry
//!
//! Error code format: TURF-STORE-{sequence}. Business-rule failures carry
//! enough context for callers to branch on (the UI treats "already
//! contesting" and "not enough gold" differently).

use thiserror::Error;

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence and business-rule errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// [TURF-STORE-001] Tile does not exist on the seeded map
    #[error("[TURF-STORE-001] Tile not found: {tile_id}")]
    TileNotFound { tile_id: String },

    /// [TURF-STORE-002] Guild already holds an entry for this tile and period
    #[error("[TURF-STORE-002] Guild {guild_id} is already contesting tile {tile_id} in {period}")]
    AlreadyContesting {
        tile_id: String,
        guild_id: String,
        period: String,
    },

    /// [TURF-STORE-003] Athlete cannot cover the contest cost
    #[error("[TURF-STORE-003] Insufficient gold: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// [TURF-STORE-004] Athlete record missing
    #[error("[TURF-STORE-004] Athlete not found: {athlete_id}")]
    AthleteNotFound { athlete_id: String },

    /// [TURF-STORE-005] Persisted value failed to parse back
    #[error("[TURF-STORE-005] Corrupt stored value: {reason}")]
    Corrupt { reason: String },

    /// Connection mutex was poisoned by a panicking writer
    #[error("Database lock poisoned")]
    LockPoisoned,

    /// Underlying database error
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Domain validation error
    #[error(transparent)]
    Core(#[from] turf_core::CoreError),
}

impl StoreError {
    /// True for failures the caller can surface and recover from
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            StoreError::TileNotFound { .. }
                | StoreError::AlreadyContesting { .. }
                | StoreError::InsufficientFunds { .. }
                | StoreError::AthleteNotFound { .. }
        )
    }
}
