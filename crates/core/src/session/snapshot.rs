use serde::Serialize;

use crate::{
    catalog::ScoringRule,
    models::{FishEntry, RouteInfo},
};

use super::state::{format_tenths, CastPhase, SessionState};

/// One row of the target list as the shell paints it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetView {
    pub name: String,
    pub tug: u8,
    pub tug_glyph: &'static str,
    /// `2` or `2-5`.
    pub window: String,
    pub points: u32,
    pub is_mooch: bool,
    pub in_bite_window: bool,
}

/// Read-only picture of the session handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub active: bool,
    pub route_id: Option<String>,
    /// Display name of the current stop, e.g. `Rhotano Sea (Sunset)`.
    pub route_name: Option<String>,
    pub bait: Option<String>,
    pub spectral_bait: Option<String>,
    pub targets: Vec<TargetView>,
    /// Elapsed cast time with one decimal.
    pub elapsed: String,
    pub elapsed_seconds: f64,
    pub casting: bool,
    pub spectral: bool,
    pub mooch: bool,
    pub route_cursor: usize,
}

impl Snapshot {
    /// Picture shown outside the activity zone.
    pub fn inactive() -> Self {
        Self {
            elapsed: format_tenths(0),
            ..Self::default()
        }
    }

    /// Assemble a snapshot from the session state and the current stop.
    pub fn build(
        state: &SessionState,
        route_id: Option<&str>,
        stop: Option<&RouteInfo>,
        scoring: ScoringRule,
        lead_bias: f64,
    ) -> Self {
        if !state.active {
            return Self::inactive();
        }

        let elapsed_seconds = state.elapsed_seconds();
        let (casting, mooch) = match state.phase {
            CastPhase::Casting { mooch, .. } => (true, mooch),
            CastPhase::Idle => (false, false),
        };
        let targets = stop
            .map(|info| {
                info.targets
                    .iter()
                    .map(|fish| TargetView {
                        name: fish.name.clone(),
                        tug: fish.tug,
                        tug_glyph: fish.tug_glyph(),
                        window: fish.window_label(),
                        points: scoring.points(fish),
                        is_mooch: fish.mooch,
                        in_bite_window: state.spectral
                            && in_bite_window(fish, elapsed_seconds, lead_bias),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            active: true,
            route_id: route_id.map(str::to_string),
            route_name: stop.map(|info| info.name.clone()),
            bait: stop.map(|info| info.bait.clone()),
            spectral_bait: stop.map(|info| info.spectral_bait.clone()),
            targets,
            elapsed: format_tenths(state.elapsed_tenths),
            elapsed_seconds,
            casting,
            spectral: state.spectral,
            mooch,
            route_cursor: state.route_cursor,
        }
    }
}

/// Whether `elapsed` seconds falls inside the fish's bite window, shifted
/// earlier by `lead_bias` to account for log latency.
pub fn in_bite_window(fish: &FishEntry, elapsed: f64, lead_bias: f64) -> bool {
    let lower = fish.min_time - lead_bias;
    let upper = fish.max_time - lead_bias;
    elapsed >= lower && elapsed <= upper
}
