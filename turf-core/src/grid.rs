//! Tile Grid
//!
//! Deterministic geocoding over a single global tiling scheme: the map is a
//! fixed-resolution grid of 0.005-degree cells (roughly 550 m north-south).
//! A coordinate always lands in exactly one cell, and the cell id encodes
//! the quantized indices, so the mapping is stable across processes and
//! releases.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Coordinate;

/// Grid cell edge length in degrees
pub const TILE_RESOLUTION_DEG: f64 = 0.005;

/// Home-zone geofence radius around an athlete's registered home coordinate
pub const HOME_ZONE_RADIUS_M: f64 = 500.0;

/// Mean earth radius used for great-circle distances
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Tile identifier: `"{lat_idx}:{lng_idx}"` of the quantized grid cell
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId(pub String);

impl TileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Geocode a validated coordinate to its tile
    pub fn from_coord(coord: Coordinate) -> Self {
        let lat_idx = (coord.lat / TILE_RESOLUTION_DEG).floor() as i32;
        let lng_idx = (coord.lng / TILE_RESOLUTION_DEG).floor() as i32;
        Self(format!("{lat_idx}:{lng_idx}"))
    }

    /// Geocode a raw lat/lng pair, rejecting out-of-range input
    pub fn from_lat_lng(lat: f64, lng: f64) -> CoreResult<Self> {
        Ok(Self::from_coord(Coordinate::new(lat, lng)?))
    }

    /// Quantized grid indices encoded in the id
    pub fn cell_indices(&self) -> CoreResult<(i32, i32)> {
        let malformed = || CoreError::MalformedTileId { raw: self.0.clone() };
        let (lat_raw, lng_raw) = self.0.split_once(':').ok_or_else(malformed)?;
        let lat_idx: i32 = lat_raw.parse().map_err(|_| malformed())?;
        let lng_idx: i32 = lng_raw.parse().map_err(|_| malformed())?;
        Ok((lat_idx, lng_idx))
    }

    /// Approximate inverse of [`TileId::from_coord`]: the cell center
    pub fn centroid(&self) -> CoreResult<Coordinate> {
        let (lat_idx, lng_idx) = self.cell_indices()?;
        Ok(Coordinate {
            lat: (lat_idx as f64 + 0.5) * TILE_RESOLUTION_DEG,
            lng: (lng_idx as f64 + 0.5) * TILE_RESOLUTION_DEG,
        })
    }
}

impl std::fmt::Display for TileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Great-circle distance between two coordinates in meters
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// True iff the tile's centroid lies within the home-zone geofence
pub fn is_within_home_zone(tile_id: &TileId, home: Coordinate) -> CoreResult<bool> {
    let centroid = tile_id.centroid()?;
    Ok(haversine_m(centroid, home) <= HOME_ZONE_RADIUS_M)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_geocoding_is_deterministic() {
        let a = TileId::from_coord(coord(52.5200, 13.4050));
        let b = TileId::from_coord(coord(52.5200, 13.4050));
        assert_eq!(a, b);
    }

    #[test]
    fn test_nearby_points_share_a_tile() {
        let a = TileId::from_coord(coord(52.52001, 13.40501));
        let b = TileId::from_coord(coord(52.52002, 13.40502));
        assert_eq!(a, b);

        // A point one full cell away does not
        let c = TileId::from_coord(coord(52.52001 + TILE_RESOLUTION_DEG, 13.40501));
        assert_ne!(a, c);
    }

    #[test]
    fn test_negative_coordinates_quantize_consistently() {
        let id = TileId::from_coord(coord(-33.8688, 151.2093));
        let centroid = id.centroid().unwrap();
        assert!(centroid.lat < 0.0);
        assert_eq!(id, TileId::from_coord(centroid));
    }

    #[test]
    fn test_centroid_is_inside_the_cell() {
        let origin = coord(48.8566, 2.3522);
        let id = TileId::from_coord(origin);
        let centroid = id.centroid().unwrap();
        assert!((centroid.lat - origin.lat).abs() <= TILE_RESOLUTION_DEG);
        assert!((centroid.lng - origin.lng).abs() <= TILE_RESOLUTION_DEG);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(TileId::from_lat_lng(90.1, 0.0).is_err());
        assert!(TileId::from_lat_lng(0.0, 180.1).is_err());
        assert!(TileId::from_lat_lng(89.9, -180.0).is_ok());
    }

    #[test]
    fn test_malformed_tile_id() {
        assert!(matches!(
            TileId::new("not-a-tile").centroid(),
            Err(CoreError::MalformedTileId { .. })
        ));
        assert!(TileId::new("12:x").cell_indices().is_err());
        assert!(TileId::new("10400:2681").cell_indices().is_ok());
    }

    #[test]
    fn test_haversine_known_distances() {
        // One degree of latitude is ~111.2 km
        let d = haversine_m(coord(0.0, 0.0), coord(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 300.0, "got {d}");

        // Zero distance
        assert_eq!(haversine_m(coord(10.0, 10.0), coord(10.0, 10.0)), 0.0);
    }

    #[test]
    fn test_home_tile_is_always_in_the_home_zone() {
        // The half-cell diagonal is under 400 m, inside the 500 m radius
        let home = coord(52.5200, 13.4050);
        let tile = TileId::from_coord(home);
        assert!(is_within_home_zone(&tile, home).unwrap());
    }

    #[test]
    fn test_distant_tile_is_outside_the_home_zone() {
        let home = coord(52.5200, 13.4050);
        let far = TileId::from_coord(coord(52.5300, 13.4050)); // ~1.1 km north
        assert!(!is_within_home_zone(&far, home).unwrap());
    }
}
