use std::time::{Duration, Instant};

use serde::Serialize;

use crate::logline::LogEvent;

/// Whether a line is in the water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CastPhase {
    Idle,
    Casting { spectral: bool, mooch: bool },
}

impl CastPhase {
    pub fn is_casting(self) -> bool {
        matches!(self, CastPhase::Casting { .. })
    }
}

/// Mutable state of an ocean fishing session.
///
/// Every change goes through [`SessionState::transition`] (log events),
/// [`SessionState::tick`] (timer) or the zone methods, each of which returns
/// the next state without touching the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub phase: CastPhase,
    /// Whether the latest cast went into the spectral current. Outlives the
    /// cast so that a mooch after a bite keeps the same water.
    pub spectral: bool,
    pub cast_started: Option<Instant>,
    /// Elapsed cast time in whole tenths of a second.
    pub elapsed_tenths: u64,
    /// Index into the active route's stops.
    pub route_cursor: usize,
    /// The player is inside an ocean fishing zone.
    pub active: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: CastPhase::Idle,
            spectral: false,
            cast_started: None,
            elapsed_tenths: 0,
            route_cursor: 0,
            active: false,
        }
    }
}

impl SessionState {
    /// Apply a classified log event observed at `now`.
    pub fn transition(self, event: LogEvent, now: Instant) -> Self {
        match event {
            LogEvent::AreaChange if self.active => Self {
                route_cursor: self.route_cursor + 1,
                ..self
            },
            LogEvent::AreaChange => self,
            LogEvent::Cast => self.start_cast(false, false, now),
            LogEvent::SpectralCast => self.start_cast(true, false, now),
            LogEvent::Mooch => self.start_cast(self.spectral, true, now),
            LogEvent::Miss | LogEvent::Quit | LogEvent::Bite => self.stop_cast(now),
        }
    }

    /// Whether the timer loop should keep running.
    pub fn should_tick(&self) -> bool {
        self.active && self.phase.is_casting()
    }

    /// Recompute the elapsed cast time. Stale ticks leave the state untouched.
    pub fn tick(self, now: Instant) -> Self {
        if !self.should_tick() {
            return self;
        }
        Self {
            elapsed_tenths: self.elapsed_at(now),
            ..self
        }
    }

    /// Enter the activity zone: everything starts over.
    pub fn enter_activity(self) -> Self {
        Self {
            active: true,
            ..Self::default()
        }
    }

    /// Leave the activity zone. The cast is left as-is; nothing is shown
    /// or timed while inactive.
    pub fn leave_activity(self) -> Self {
        Self {
            active: false,
            ..self
        }
    }

    /// Elapsed cast time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_tenths as f64 / 10.0
    }

    fn start_cast(self, spectral: bool, mooch: bool, now: Instant) -> Self {
        Self {
            phase: CastPhase::Casting { spectral, mooch },
            spectral,
            cast_started: Some(now),
            elapsed_tenths: 0,
            ..self
        }
    }

    fn stop_cast(self, now: Instant) -> Self {
        if !self.phase.is_casting() {
            return self;
        }
        let elapsed_tenths = if self.active {
            self.elapsed_at(now)
        } else {
            self.elapsed_tenths
        };
        Self {
            phase: CastPhase::Idle,
            elapsed_tenths,
            ..self
        }
    }

    fn elapsed_at(&self, now: Instant) -> u64 {
        let measured = self
            .cast_started
            .map(|started| to_tenths(now.saturating_duration_since(started)))
            .unwrap_or(0);
        measured.max(self.elapsed_tenths)
    }
}

/// Round a duration to the nearest tenth of a second.
pub fn to_tenths(duration: Duration) -> u64 {
    ((duration.as_millis() + 50) / 100) as u64
}

/// Format tenths of a second with exactly one decimal, e.g. `3.0`.
pub fn format_tenths(tenths: u64) -> String {
    format!("{}.{}", tenths / 10, tenths % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENTS: [LogEvent; 7] = [
        LogEvent::AreaChange,
        LogEvent::Cast,
        LogEvent::SpectralCast,
        LogEvent::Mooch,
        LogEvent::Miss,
        LogEvent::Quit,
        LogEvent::Bite,
    ];

    fn active() -> SessionState {
        SessionState::default().enter_activity()
    }

    #[test]
    fn cast_resets_timer_to_zero() {
        let start = Instant::now();
        let mut state = active().transition(LogEvent::Cast, start);
        state = state.tick(start + Duration::from_millis(4_300));
        assert_eq!(state.elapsed_tenths, 43);

        let recast = start + Duration::from_secs(10);
        for event in [LogEvent::Cast, LogEvent::SpectralCast, LogEvent::Mooch] {
            let next = state.transition(event, recast);
            assert_eq!(next.elapsed_tenths, 0);
            assert_eq!(next.elapsed_seconds(), 0.0);
            assert_eq!(next.cast_started, Some(recast));
            assert!(next.phase.is_casting());
        }
    }

    #[test]
    fn cast_variants_set_flags() {
        let now = Instant::now();
        let plain = active().transition(LogEvent::Cast, now);
        assert_eq!(
            plain.phase,
            CastPhase::Casting {
                spectral: false,
                mooch: false
            }
        );

        let spectral = plain.transition(LogEvent::SpectralCast, now);
        assert_eq!(
            spectral.phase,
            CastPhase::Casting {
                spectral: true,
                mooch: false
            }
        );

        // A mooch follows the bite and keeps the water of the previous cast.
        let bitten = spectral.transition(LogEvent::Bite, now);
        let mooch = bitten.transition(LogEvent::Mooch, now);
        assert_eq!(
            mooch.phase,
            CastPhase::Casting {
                spectral: true,
                mooch: true
            }
        );

        let plain_mooch = plain
            .transition(LogEvent::Bite, now)
            .transition(LogEvent::Mooch, now);
        assert_eq!(
            plain_mooch.phase,
            CastPhase::Casting {
                spectral: false,
                mooch: true
            }
        );
    }

    #[test]
    fn ending_events_stop_the_cast() {
        let start = Instant::now();
        for event in [LogEvent::Miss, LogEvent::Quit, LogEvent::Bite] {
            let state = active()
                .transition(LogEvent::Cast, start)
                .transition(event, start + Duration::from_millis(2_300));
            assert_eq!(state.phase, CastPhase::Idle);
            assert_eq!(format_tenths(state.elapsed_tenths), "2.3");
            assert!(!state.should_tick());
            assert_eq!(state.tick(start + Duration::from_secs(9)), state);
        }
    }

    #[test]
    fn cast_then_miss_is_idle() {
        let now = Instant::now();
        let state = active()
            .transition(LogEvent::Cast, now)
            .transition(LogEvent::Miss, now);
        assert_eq!(state.phase, CastPhase::Idle);
    }

    #[test]
    fn area_change_only_counts_while_active() {
        let now = Instant::now();
        let state = active().transition(LogEvent::AreaChange, now);
        assert_eq!(state.route_cursor, 1);
        assert_eq!(state.elapsed_tenths, 0);
        assert_eq!(state.phase, CastPhase::Idle);

        let outside = SessionState::default().transition(LogEvent::AreaChange, now);
        assert_eq!(outside.route_cursor, 0);
    }

    #[test]
    fn area_change_leaves_cast_running() {
        let start = Instant::now();
        let casting = active()
            .transition(LogEvent::SpectralCast, start)
            .tick(start + Duration::from_millis(1_000));
        let moved = casting.transition(LogEvent::AreaChange, start + Duration::from_secs(2));
        assert_eq!(moved.phase, casting.phase);
        assert_eq!(moved.elapsed_tenths, 10);
        assert_eq!(moved.cast_started, casting.cast_started);
    }

    #[test]
    fn transition_table_is_total() {
        let now = Instant::now();
        let states = [
            SessionState::default(),
            active(),
            active().transition(LogEvent::Cast, now),
            active().transition(LogEvent::SpectralCast, now),
            active()
                .transition(LogEvent::SpectralCast, now)
                .transition(LogEvent::Mooch, now),
            active().transition(LogEvent::Cast, now).leave_activity(),
        ];
        for state in states {
            for event in EVENTS {
                let next = state.transition(event, now + Duration::from_millis(500));
                match event {
                    LogEvent::Cast | LogEvent::SpectralCast | LogEvent::Mooch => {
                        assert!(next.phase.is_casting())
                    }
                    LogEvent::Miss | LogEvent::Quit | LogEvent::Bite => {
                        assert_eq!(next.phase, CastPhase::Idle)
                    }
                    LogEvent::AreaChange => assert_eq!(next.phase, state.phase),
                }
                assert_eq!(next.active, state.active);
            }
        }
    }

    #[test]
    fn ticks_never_decrease() {
        let start = Instant::now();
        let mut state = active().transition(LogEvent::Cast, start);
        let mut previous = state.elapsed_tenths;
        for step in 0..200u64 {
            state = state.tick(start + Duration::from_millis(step * 37));
            assert!(state.elapsed_tenths >= previous);
            previous = state.elapsed_tenths;
        }
        // An out-of-order instant never winds the timer back.
        let rewound = state.tick(start);
        assert_eq!(rewound.elapsed_tenths, previous);
    }

    #[test]
    fn inactive_session_does_not_tick() {
        let start = Instant::now();
        let state = active().transition(LogEvent::Cast, start).leave_activity();
        assert!(state.phase.is_casting());
        assert!(!state.should_tick());
        assert_eq!(state.tick(start + Duration::from_secs(3)).elapsed_tenths, 0);
    }

    #[test]
    fn entering_activity_resets_everything() {
        let start = Instant::now();
        let state = active()
            .transition(LogEvent::AreaChange, start)
            .transition(LogEvent::SpectralCast, start)
            .tick(start + Duration::from_secs(1))
            .leave_activity()
            .enter_activity();
        assert_eq!(state, active());
        assert_eq!(state.route_cursor, 0);
        assert_eq!(state.phase, CastPhase::Idle);
    }

    #[test]
    fn formats_one_decimal() {
        assert_eq!(format_tenths(0), "0.0");
        assert_eq!(format_tenths(30), "3.0");
        assert_eq!(format_tenths(123), "12.3");
        assert_eq!(to_tenths(Duration::from_millis(2_349)), 23);
        assert_eq!(to_tenths(Duration::from_millis(2_350)), 24);
    }
}
