//! Row Entities
//!
//! Plain structs mirroring the persisted tables, with conversions into the
//! pure domain views consumed by `turf-core`.

pub mod athlete;
pub mod contest;
pub mod history;
pub mod tile;

pub use athlete::AthleteEntity;
pub use contest::ContestEntryEntity;
pub use history::TerritoryHistoryEntity;
pub use tile::TileEntity;

use chrono::{DateTime, Utc};

use crate::error::{StoreError, StoreResult};

/// Timestamp encoding used for all TEXT timestamp columns
pub(crate) fn fmt_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn parse_ts(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt {
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_round_trip() {
        let ts = Utc.with_ymd_and_hms(2025, 10, 13, 6, 30, 0).unwrap();
        assert_eq!(parse_ts(&fmt_ts(ts)).unwrap(), ts);
    }

    #[test]
    fn test_garbage_timestamp_is_corrupt() {
        assert!(matches!(
            parse_ts("last tuesday"),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
