use glimpse_types::CaptureRegion;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct CaptureConfig {
    /// Fixed region to grab; `None` captures the full primary display.
    pub region: Option<CaptureRegion>,
}
