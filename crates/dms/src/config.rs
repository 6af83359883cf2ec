//! DMS configuration

use serde::{Deserialize, Serialize};

/// Drowsiness detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye aspect ratio below which a frame counts as eyes-closed
    pub ear_threshold: f32,

    /// Consecutive eyes-closed frames before the drowsiness alert is raised
    /// (50 frames is a couple of seconds at typical webcam rates)
    pub consecutive_frames: u32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.3,
            consecutive_frames: 50,
        }
    }
}

impl DmsConfig {
    /// Create strict config (alerts sooner)
    pub fn strict() -> Self {
        Self {
            consecutive_frames: 30,
            ..Default::default()
        }
    }

    /// Create lenient config (alerts later, tolerates narrower eyes)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.25,
            consecutive_frames: 75,
        }
    }
}
