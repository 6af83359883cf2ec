//! Per-frame DMS analysis results

use serde::{Deserialize, Serialize};
use crate::ear::EyeOpenness;
use crate::state::{AlertTransition, DetectorState};

/// Result of processing one landmark frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Frame sequence number
    pub sequence: u64,

    /// Number of faces reported by the landmark provider
    pub faces_detected: usize,

    /// Aggregated openness fed to the detector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openness: Option<EyeOpenness>,

    /// Alert transition caused by this frame
    pub transition: AlertTransition,

    /// Counter value after this frame
    pub consecutive_low_frames: u32,

    /// Whether the alert is active after this frame
    pub alert_active: bool,
}

impl FrameAnalysis {
    pub fn new(
        sequence: u64,
        faces_detected: usize,
        openness: Option<EyeOpenness>,
        transition: AlertTransition,
        state: DetectorState,
    ) -> Self {
        Self {
            sequence,
            faces_detected,
            openness,
            transition,
            consecutive_low_frames: state.consecutive_low_frames,
            alert_active: state.alert_active,
        }
    }

    /// Status line for display overlays
    pub fn status_text(&self) -> &'static str {
        if self.alert_active {
            "DROWSY ALERT!"
        } else {
            "Monitoring..."
        }
    }

    /// EAR line for display overlays
    pub fn ear_text(&self) -> String {
        match self.openness {
            Some(ear) => format!("EAR: {:.2}", ear.value()),
            None => "EAR: --".to_string(),
        }
    }
}
