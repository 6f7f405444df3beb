//! Voyage rotation keyed off wall-clock time.

use chrono::{DateTime, Duration, Utc};

use crate::{
    catalog::{Catalog, CatalogError},
    models::Route,
};

/// Hours between consecutive departures.
pub const DEPARTURE_INTERVAL_HOURS: i64 = 2;

/// Maps wall-clock time onto the catalog's route rotation.
///
/// Departures rotate every two hours from `anchor`; `anchor_offset` is the
/// rotation index of the voyage departing at the anchor itself. During the
/// odd hour between departures the *next* voyage is reported, so the board
/// shows the upcoming route an hour before it leaves.
///
/// Hours are counted with floor division, so instants before the anchor
/// keep the same odd/even cadence as instants after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteScheduler {
    anchor: DateTime<Utc>,
    anchor_offset: i64,
}

impl RouteScheduler {
    /// Scheduler counting departures from `anchor`.
    pub fn new(anchor: DateTime<Utc>, anchor_offset: i64) -> Self {
        Self {
            anchor,
            anchor_offset,
        }
    }

    /// Whole hours from the anchor to `now`, rounded toward negative infinity.
    pub fn hours_since_anchor(&self, now: DateTime<Utc>) -> i64 {
        let elapsed: Duration = now - self.anchor;
        elapsed.num_seconds().div_euclid(3600)
    }

    /// Rotation index for `now` given `pattern_count` voyage patterns.
    pub fn route_index(&self, now: DateTime<Utc>, pattern_count: usize) -> usize {
        if pattern_count == 0 {
            return 0;
        }
        let mut hours = self.hours_since_anchor(now);
        if hours.rem_euclid(DEPARTURE_INTERVAL_HOURS) == 1 {
            hours += 1;
        }
        let departures = hours.div_euclid(DEPARTURE_INTERVAL_HOURS);
        (departures + self.anchor_offset).rem_euclid(pattern_count as i64) as usize
    }

    /// The voyage shown at `now`.
    pub fn current_route(
        &self,
        now: DateTime<Utc>,
        catalog: &Catalog,
    ) -> Result<Route, CatalogError> {
        catalog.scheduled_route(self.route_index(now, catalog.schedule_len()))
    }
}
