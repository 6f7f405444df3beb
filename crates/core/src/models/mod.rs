#![allow(missing_docs)]

//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// In-game time of day at a fishing stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// Daylight.
    Day,
    /// Dusk.
    Sunset,
    /// Nighttime.
    Night,
}

impl TimeOfDay {
    /// Every time of day in display order.
    pub const ALL: [TimeOfDay; 3] = [TimeOfDay::Day, TimeOfDay::Sunset, TimeOfDay::Night];

    /// Capitalised label used in route names.
    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Sunset => "Sunset",
            TimeOfDay::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One stop of a voyage: a fishing location visited at a time of day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteSlot {
    /// Fishing area name (e.g. `Galadion Bay`).
    pub location: String,
    /// Time of day while the boat is at this stop.
    pub time: TimeOfDay,
}

impl RouteSlot {
    /// Returns the user-facing label, e.g. `Galadion Bay (Night)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.location, self.time.label())
    }
}

/// A fixed voyage pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Identifier from the catalog's `routes` table.
    pub id: String,
    /// Ordered stops visited on this voyage.
    pub stops: Vec<RouteSlot>,
}

impl Route {
    /// Index of the stop at `cursor`, wrapping past the last stop back to
    /// the first. `None` for a route without stops.
    pub fn stop_index(&self, cursor: usize) -> Option<usize> {
        cursor.checked_rem(self.stops.len())
    }
}

/// Static catalog record for a single fish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishEntry {
    pub name: String,
    #[serde(default)]
    pub recommended: bool,
    /// Time of day the fish requires, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeOfDay>,
    /// Bait the fish bites on, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bait: Option<String>,
    #[serde(default)]
    pub bait_required: bool,
    /// Caught by mooching another fish instead of with bait.
    #[serde(default)]
    pub mooch: bool,
    /// Earliest bite, in seconds since the cast.
    pub min_time: f64,
    /// Latest bite, in seconds since the cast.
    pub max_time: f64,
    /// Tug strength, 1 (light) to 3 (heavy).
    pub tug: u8,
    pub points: u32,
    /// Largest double/triple hook yield.
    pub max_dh: u32,
}

impl FishEntry {
    /// Bite window label: a single value when the bounds coincide, `min-max` otherwise.
    pub fn window_label(&self) -> String {
        if self.min_time == self.max_time {
            format_seconds(self.min_time)
        } else {
            format!(
                "{}-{}",
                format_seconds(self.min_time),
                format_seconds(self.max_time)
            )
        }
    }

    /// Exclamation glyphs for the tug tier.
    pub fn tug_glyph(&self) -> &'static str {
        match self.tug {
            1 => "!",
            2 => "!!",
            _ => "!!!",
        }
    }
}

/// Bait recommendations for a fishing location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaitSet {
    /// Bait used outside the spectral current.
    pub default: String,
    pub day: String,
    pub sunset: String,
    pub night: String,
}

impl BaitSet {
    /// Spectral current bait for the given time of day.
    pub fn spectral(&self, time: TimeOfDay) -> &str {
        match time {
            TimeOfDay::Day => &self.day,
            TimeOfDay::Sunset => &self.sunset,
            TimeOfDay::Night => &self.night,
        }
    }
}

/// Precomputed view of one stop: display name, baits and eligible fish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub name: String,
    pub bait: String,
    pub spectral_bait: String,
    /// Eligible fish ordered by earliest bite.
    pub targets: Vec<FishEntry>,
}

fn format_seconds(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
