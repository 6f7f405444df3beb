use std::time::Instant;

use chrono::{DateTime, Utc};
use tidewatch_core::{Host, Snapshot};

/// Terminal side of the tracker: real clocks, a pending frame flag the event
/// loop checks, and the last published snapshot.
pub struct TerminalHost {
    frame_pending: bool,
    snapshot: Snapshot,
    dirty: bool,
}

impl TerminalHost {
    pub fn new() -> Self {
        Self {
            frame_pending: false,
            snapshot: Snapshot::inactive(),
            dirty: true,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Whether the tracker asked for another frame.
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    /// Consume a pending frame request.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::replace(&mut self.frame_pending, false)
    }

    /// Whether something was published since the last redraw.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Host for TerminalHost {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn request_frame(&mut self) {
        self.frame_pending = true;
    }

    fn publish(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.dirty = true;
    }
}
