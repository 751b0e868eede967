//! Shared Domain Types
//!
//! Naming conventions follow the rest of the workspace:
//! - snake_case field names
//! - *_id suffix for identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::grid::TileId;

/// Guild identifier (membership is managed by an external collaborator)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GuildId(pub String);

impl GuildId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Athlete (user) identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AthleteId(pub String);

impl AthleteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AthleteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A WGS84 coordinate pair
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range lat/lng
    pub fn new(lat: f64, lng: f64) -> CoreResult<Self> {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::CoordinateOutOfRange { lat, lng });
        }
        Ok(Self { lat, lng })
    }
}

/// Per-workout contribution metrics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutMetrics {
    /// Training volume of the workout
    pub volume: i64,
    /// Experience earned by the workout
    pub xp: i64,
}

impl WorkoutMetrics {
    /// Create metrics, rejecting negative values before they reach the ledger
    pub fn new(volume: i64, xp: i64) -> CoreResult<Self> {
        if volume < 0 || xp < 0 {
            return Err(CoreError::NegativeMetrics { volume, xp });
        }
        Ok(Self { volume, xp })
    }
}

/// Read-only view of a tile's persisted state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    /// Tile identifier
    pub tile_id: TileId,
    /// Approximate cell center, for rendering and geofencing
    pub centroid: Coordinate,
    /// Region/type tag assigned at map seed
    pub region: String,
    /// Guild currently controlling the tile, if any
    pub controlling_guild_id: Option<GuildId>,
    /// Timestamp of the last ownership change
    pub controlled_at: Option<DateTime<Utc>>,
}

/// One guild's aggregate position in a tile contest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestStanding {
    /// Contesting guild
    pub guild_id: GuildId,
    /// Number of qualifying workouts recorded
    pub workout_count: i64,
    /// Sum of workout volume
    pub total_volume: i64,
    /// Sum of experience earned
    pub xp_earned: i64,
    /// When the guild opened the contest
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(52.52, 13.405).is_ok());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());

        let err = Coordinate::new(91.0, 0.0).unwrap_err();
        assert!(matches!(err, CoreError::CoordinateOutOfRange { .. }));
        assert!(Coordinate::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_metrics_validation() {
        assert!(WorkoutMetrics::new(0, 0).is_ok());
        assert!(WorkoutMetrics::new(1200, 35).is_ok());
        assert!(matches!(
            WorkoutMetrics::new(-1, 5),
            Err(CoreError::NegativeMetrics { .. })
        ));
        assert!(WorkoutMetrics::new(10, -5).is_err());
    }

    #[test]
    fn test_guild_id_display() {
        let id = GuildId::new("guild:iron-legion");
        assert_eq!(id.as_str(), "guild:iron-legion");
        assert_eq!(id.to_string(), "guild:iron-legion");
    }
}
