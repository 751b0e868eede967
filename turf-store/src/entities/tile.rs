//! Tile Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turf_core::{Coordinate, GuildId, TileId, TileSnapshot};

/// One cell of the seeded map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileEntity {
    /// Tile identifier derived from the grid
    pub tile_id: TileId,
    /// Cell center latitude
    pub center_lat: f64,
    /// Cell center longitude
    pub center_lng: f64,
    /// Region/type tag assigned at map seed
    pub region: String,
    /// Controlling guild; written only by settlement
    pub controlling_guild_id: Option<GuildId>,
    /// Timestamp of the last ownership change
    pub controlled_at: Option<DateTime<Utc>>,
    /// Seed timestamp
    pub created_at: DateTime<Utc>,
}

impl TileEntity {
    /// Create an unowned tile at map seed
    pub fn new(tile_id: TileId, centroid: Coordinate, region: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            tile_id,
            center_lat: centroid.lat,
            center_lng: centroid.lng,
            region: region.into(),
            controlling_guild_id: None,
            controlled_at: None,
            created_at: now,
        }
    }

    /// Read-only domain view for projection
    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            tile_id: self.tile_id.clone(),
            centroid: Coordinate {
                lat: self.center_lat,
                lng: self.center_lng,
            },
            region: self.region.clone(),
            controlling_guild_id: self.controlling_guild_id.clone(),
            controlled_at: self.controlled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tile_is_unowned() {
        let centroid = Coordinate::new(52.5225, 13.4075).unwrap();
        let tile = TileEntity::new(TileId::from_coord(centroid), centroid, "urban", Utc::now());
        assert!(tile.controlling_guild_id.is_none());
        assert!(tile.controlled_at.is_none());

        let snapshot = tile.snapshot();
        assert_eq!(snapshot.tile_id, tile.tile_id);
        assert_eq!(snapshot.centroid.lat, 52.5225);
    }
}
