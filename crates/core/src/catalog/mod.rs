#![allow(missing_docs)]

//! Static fishing catalog: voyages, rotation, baits and fish.

/// Catalog eligibility filter.
pub mod filter;
/// Catalog file loading.
pub mod loader;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BaitSet, FishEntry, Route, RouteInfo, RouteSlot, TimeOfDay};

pub use filter::fish_targets;
pub use loader::load_catalog;

/// Embedded default catalog shipped with the library.
pub const EMBEDDED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Errors raised when the catalog violates its data contract.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog schedule is empty")]
    EmptySchedule,
    #[error("schedule references unknown route '{0}'")]
    UnknownRoute(String),
    #[error("route '{0}' has no stops")]
    EmptyRoute(String),
    #[error("no fish table for location '{0}'")]
    MissingFish(String),
    #[error("no bait table for location '{0}'")]
    MissingBait(String),
    #[error("{name}: bite window {min_time}-{max_time} is inverted")]
    InvalidWindow {
        name: String,
        min_time: f64,
        max_time: f64,
    },
    #[error("{name}: tug tier {tug} outside 1-3")]
    InvalidTug { name: String, tug: u8 },
}

/// Point formula applied to a target fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// `max_dh * points`.
    DoubleHook,
    /// `((max_dh - 1) * 2 + 1) * points * 2`.
    #[default]
    TripleHook,
}

impl ScoringRule {
    /// Best-case score for `fish`, saturating at `u32::MAX` for absurd
    /// catalog values.
    pub fn points(self, fish: &FishEntry) -> u32 {
        match self {
            ScoringRule::DoubleHook => fish.max_dh.saturating_mul(fish.points),
            ScoringRule::TripleHook => fish
                .max_dh
                .saturating_sub(1)
                .saturating_mul(2)
                .saturating_add(1)
                .saturating_mul(fish.points)
                .saturating_mul(2),
        }
    }
}

/// Fixed lookup tables describing every voyage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub scoring: ScoringRule,
    /// Rotation of route ids, one per two-hour departure window.
    pub schedule: Vec<String>,
    pub routes: BTreeMap<String, Vec<RouteSlot>>,
    pub baits: BTreeMap<String, BaitSet>,
    pub fish: BTreeMap<String, Vec<FishEntry>>,
}

impl Catalog {
    /// Parse and validate a catalog document.
    pub fn from_json(input: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(input)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog compiled into the library.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Check that every scheduled stop resolves to fish and bait tables
    /// and that every fish record is well formed.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.schedule.is_empty() {
            return Err(CatalogError::EmptySchedule);
        }
        for id in &self.schedule {
            let stops = self
                .routes
                .get(id)
                .ok_or_else(|| CatalogError::UnknownRoute(id.clone()))?;
            if stops.is_empty() {
                return Err(CatalogError::EmptyRoute(id.clone()));
            }
            for stop in stops {
                if !self.fish.contains_key(&stop.location) {
                    return Err(CatalogError::MissingFish(stop.location.clone()));
                }
                if !self.baits.contains_key(&stop.location) {
                    return Err(CatalogError::MissingBait(stop.location.clone()));
                }
            }
        }
        for entries in self.fish.values() {
            for fish in entries {
                if fish.min_time > fish.max_time {
                    return Err(CatalogError::InvalidWindow {
                        name: fish.name.clone(),
                        min_time: fish.min_time,
                        max_time: fish.max_time,
                    });
                }
                if !(1..=3).contains(&fish.tug) {
                    return Err(CatalogError::InvalidTug {
                        name: fish.name.clone(),
                        tug: fish.tug,
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of entries in the rotation.
    pub fn schedule_len(&self) -> usize {
        self.schedule.len()
    }

    /// Route at a rotation index. The index wraps around the schedule.
    pub fn scheduled_route(&self, index: usize) -> Result<Route, CatalogError> {
        if self.schedule.is_empty() {
            return Err(CatalogError::EmptySchedule);
        }
        let id = &self.schedule[index % self.schedule.len()];
        let stops = self
            .routes
            .get(id)
            .ok_or_else(|| CatalogError::UnknownRoute(id.clone()))?;
        Ok(Route {
            id: id.clone(),
            stops: stops.clone(),
        })
    }

    /// Display information for a single stop.
    pub fn route_info(&self, slot: &RouteSlot) -> Result<RouteInfo, CatalogError> {
        let fish = self
            .fish
            .get(&slot.location)
            .ok_or_else(|| CatalogError::MissingFish(slot.location.clone()))?;
        let baits = self
            .baits
            .get(&slot.location)
            .ok_or_else(|| CatalogError::MissingBait(slot.location.clone()))?;
        Ok(fish_targets(&slot.location, slot.time, fish, baits))
    }

    /// Precomputed display information for every stop of a voyage.
    pub fn voyage(&self, route: &Route) -> Result<Vec<RouteInfo>, CatalogError> {
        route
            .stops
            .iter()
            .map(|slot| self.route_info(slot))
            .collect()
    }

    /// Every location at every time of day, in catalog order.
    pub fn overview(&self) -> Result<Vec<RouteInfo>, CatalogError> {
        let mut result = Vec::with_capacity(self.fish.len() * TimeOfDay::ALL.len());
        for location in self.fish.keys() {
            for time in TimeOfDay::ALL {
                result.push(self.route_info(&RouteSlot {
                    location: location.clone(),
                    time,
                })?);
            }
        }
        Ok(result)
    }
}
