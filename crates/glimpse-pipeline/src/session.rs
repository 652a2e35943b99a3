use std::time::Instant;

use glimpse_types::{RoutePath, SessionPhase};
use tracing::trace;
use uuid::Uuid;

/// One trigger's journey to a terminal phase. Advancing follows the
/// fixed order checked by [`permitted`]; terminal phases have no exits.
pub struct CaptureSession {
    id: Uuid,
    phase: SessionPhase,
    route: Option<RoutePath>,
    started: Instant,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Created,
            route: None,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn route(&self) -> Option<RoutePath> {
        self.route
    }

    pub fn set_route(&mut self, route: RoutePath) {
        self.route = Some(route);
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    pub fn advance(&mut self, next: SessionPhase) {
        debug_assert!(
            permitted(self.phase, next),
            "illegal phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        trace!(id = %self.id, from = ?self.phase, to = ?next, "phase change");
        self.phase = next;
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Legal phase transitions. Any non-terminal phase may fail.
pub fn permitted(from: SessionPhase, to: SessionPhase) -> bool {
    use SessionPhase::*;
    if from.is_terminal() {
        return false;
    }
    matches!(
        (from, to),
        (_, Failed)
            | (Created, Captured)
            | (Captured, Routed)
            | (Routed, OcrPending)
            | (Routed, AiPending)
            | (OcrPending, OcrDone)
            | (OcrDone, AiPending)
            | (AiPending, Completed)
    )
}
