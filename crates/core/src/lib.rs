#![warn(clippy::all, missing_docs)]

//! Cast timing and target lookup for FFXIV ocean fishing voyages.
//!
//! Lines tailed from an ACT network log are classified into fishing events
//! and fed to a [`Tracker`], which times the current cast and works out the
//! stop the boat is at from the voyage rotation. Each change is published
//! to a [`Host`] as a [`Snapshot`] listing the fish worth targeting there.

pub mod catalog;
pub mod config;
pub mod logline;
pub mod models;
pub mod schedule;
pub mod session;

pub use catalog::{load_catalog, Catalog, CatalogError, ScoringRule};
pub use config::AppConfig;
pub use logline::{classify, parse_zone_change, LogEvent, LogFeed, LogTail, TailError};
pub use models::{BaitSet, FishEntry, Route, RouteInfo, RouteSlot, TimeOfDay};
pub use schedule::RouteScheduler;
pub use session::{Host, Snapshot, TargetView, Tracker, TrackerSettings};
