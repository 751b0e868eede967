//! Engine Error Types

use thiserror::Error;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Run-level settlement failures. Per-tile failures are captured in the
/// run report instead of surfacing here.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Store failure outside any single tile's scope (candidate discovery)
    #[error("Store error: {0}")]
    Store(#[from] turf_store::StoreError),
}
