use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::{
    catalog::{Catalog, CatalogError},
    config::AppConfig,
    logline::{classify, LogEvent},
    models::{Route, RouteInfo},
    schedule::RouteScheduler,
};

use super::{snapshot::Snapshot, state::SessionState};

/// Environment the tracker runs in.
///
/// The host owns the clocks and the display. It asks the tracker for a
/// frame by calling [`Tracker::on_frame`] some time after
/// [`Host::request_frame`].
pub trait Host {
    /// Monotonic clock used for cast timing.
    fn now(&self) -> Instant;
    /// Wall clock used for the voyage rotation.
    fn utc_now(&self) -> DateTime<Utc>;
    /// Schedule one call to [`Tracker::on_frame`] on the next display refresh.
    fn request_frame(&mut self);
    /// Hand a fresh snapshot to the renderer.
    fn publish(&mut self, snapshot: Snapshot);
}

/// Knobs the tracker reads from the application config.
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub zone_ids: Vec<u32>,
    pub lead_bias: f64,
    pub scheduler: RouteScheduler,
}

impl TrackerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            zone_ids: config.ocean_zone_ids.clone(),
            lead_bias: config.lead_bias,
            scheduler: RouteScheduler::new(config.anchor, config.anchor_offset),
        }
    }
}

/// Single point of dispatch for log lines, zone changes and timer frames.
pub struct Tracker<H: Host> {
    host: H,
    catalog: Catalog,
    settings: TrackerSettings,
    state: SessionState,
    route: Option<Route>,
    voyage: Vec<RouteInfo>,
}

impl<H: Host> Tracker<H> {
    pub fn new(host: H, catalog: Catalog, settings: TrackerSettings) -> Self {
        Self {
            host,
            catalog,
            settings,
            state: SessionState::default(),
            route: None,
            voyage: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Feed one raw log line. Unrecognised lines change nothing.
    pub fn on_log_line(&mut self, line: &str) -> Option<LogEvent> {
        let event = classify(line)?;
        debug!(?event, "Classified log line");

        let was_ticking = self.state.should_tick();
        self.state = self.state.transition(event, self.host.now());
        if event == LogEvent::AreaChange && self.state.active {
            info!(cursor = self.state.route_cursor, "Boat moved to next area");
        }
        self.publish();
        if self.state.should_tick() && !was_ticking {
            self.host.request_frame();
        }
        Some(event)
    }

    /// Feed a zone change. Entering an ocean fishing zone starts a fresh
    /// session on the voyage currently scheduled.
    pub fn on_zone_change(&mut self, zone_id: u32) -> Result<(), CatalogError> {
        let in_ocean = self.settings.zone_ids.contains(&zone_id);
        match (in_ocean, self.state.active) {
            (true, false) => {
                let route = self
                    .settings
                    .scheduler
                    .current_route(self.host.utc_now(), &self.catalog)?;
                self.voyage = self.catalog.voyage(&route)?;
                info!(zone_id, route = %route.id, "Entered ocean fishing");
                self.route = Some(route);
                self.state = self.state.enter_activity();
            }
            (false, true) => {
                info!(zone_id, "Left ocean fishing");
                self.state = self.state.leave_activity();
            }
            _ => {
                debug!(zone_id, "Zone change without activity change");
                return Ok(());
            }
        }
        self.publish();
        Ok(())
    }

    /// Advance the cast timer. Frames arriving after the cast ended or the
    /// player left the zone are dropped.
    pub fn on_frame(&mut self) {
        if !self.state.should_tick() {
            return;
        }
        self.state = self.state.tick(self.host.now());
        self.publish();
        self.host.request_frame();
    }

    /// Current stop, if a voyage is loaded.
    pub fn current_stop(&self) -> Option<&RouteInfo> {
        let index = self.route.as_ref()?.stop_index(self.state.route_cursor)?;
        self.voyage.get(index)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(
            &self.state,
            self.route.as_ref().map(|route| route.id.as_str()),
            self.current_stop(),
            self.catalog.scoring,
            self.settings.lead_bias,
        )
    }

    fn publish(&mut self) {
        if self.state.active && self.current_stop().is_none() {
            warn!("Active session without a voyage");
        }
        let snapshot = self.snapshot();
        self.host.publish(snapshot);
    }
}
