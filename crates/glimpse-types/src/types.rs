use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Screen rectangle in physical pixels. `x`/`y` may be negative on
/// multi-monitor layouts where a display sits left of or above the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// PNG-encoded capture plus its pixel dimensions.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Hotkey,
    Host,
}

/// One request to run the pipeline. `region: None` means full primary
/// display.
#[derive(Debug, Clone)]
pub struct TriggerSignal {
    pub region: Option<CaptureRegion>,
    pub source: TriggerSource,
    pub template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePath {
    DirectMultimodal,
    OcrThenText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Created,
    Captured,
    Routed,
    OcrPending,
    OcrDone,
    AiPending,
    Completed,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Failed)
    }
}

/// How the host should surface a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyStyle {
    Silent,
    Toast,
    Panel,
}

#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Completed {
        answer: String,
        reasoning: Option<String>,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub id: Uuid,
    pub template: String,
    pub route: Option<RoutePath>,
    pub outcome: SessionOutcome,
    pub notify: NotifyStyle,
    pub elapsed_ms: u64,
}

/// Events the pipeline emits toward whatever hosts it.
#[derive(Debug, Clone)]
pub enum HostEvent {
    SessionStarted {
        id: Uuid,
        source: TriggerSource,
    },
    PhaseChanged {
        id: Uuid,
        phase: SessionPhase,
    },
    SessionFinished(SessionReport),
}
