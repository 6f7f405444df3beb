#![allow(missing_docs)]

//! Live ocean fishing session: cast timer, route cursor and snapshots.

/// Snapshot handed to the renderer.
pub mod snapshot;
/// Pure state transitions.
pub mod state;
/// Host-facing dispatcher.
pub mod tracker;

pub use snapshot::{in_bite_window, Snapshot, TargetView};
pub use state::{format_tenths, CastPhase, SessionState};
pub use tracker::{Host, Tracker, TrackerSettings};
