//! Core Error Registry
//!
//! Error code format: TURF-{module}-{sequence}
//! - TURF-GRID: geocoding errors
//! - TURF-METRIC: contribution metric validation

use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Domain validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// [TURF-GRID-001] Coordinate outside valid lat/lng ranges
    #[error("[TURF-GRID-001] Coordinate out of range: lat {lat}, lng {lng}")]
    CoordinateOutOfRange { lat: f64, lng: f64 },

    /// [TURF-GRID-002] Tile identifier does not parse as a grid cell
    #[error("[TURF-GRID-002] Malformed tile id: {raw}")]
    MalformedTileId { raw: String },

    /// [TURF-METRIC-001] Negative workout metrics rejected at the boundary
    #[error("[TURF-METRIC-001] Negative workout metrics: volume {volume}, xp {xp}")]
    NegativeMetrics { volume: i64, xp: i64 },
}
