//! Driver Monitoring System (DMS)
//!
//! Real-time drowsiness detection from eye landmarks:
//! - Eye aspect ratio (EAR) estimation per eye contour
//! - Worst-case aggregation of all eyes in a frame
//! - Consecutive-frame debouncing with an alert state machine
//!
//! Frame capture, landmark detection and alert output are collaborators:
//! frames come in through [`LandmarkProvider`], transitions go out to the
//! caller, which forwards them to an alert sink.

pub mod aggregation;
pub mod analysis;
pub mod config;
pub mod contour;
pub mod ear;
pub mod provider;
pub mod state;

pub use aggregation::{aggregate_frame, face_openness};
pub use analysis::FrameAnalysis;
pub use config::DmsConfig;
pub use contour::{EyeContour, FaceLandmarks, LandmarkFrame, Point};
pub use ear::{compute_openness, EyeOpenness};
pub use provider::{LandmarkProvider, StaticProvider};
pub use state::{AlertState, AlertTransition, DetectorState, DrowsinessDetector};

use thiserror::Error;
use tracing::{debug, info, warn};

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Degenerate eye contour (horizontal distance {horizontal})")]
    DegenerateGeometry { horizontal: f32 },

    #[error("Invalid contour: expected {expected} points, got {actual}")]
    InvalidContour { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Landmark provider failed: {0}")]
    Provider(String),
}

/// Driver monitoring module
pub struct DmsModule {
    detector: DrowsinessDetector,
}

impl DmsModule {
    /// Create a new DMS module with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        info!(
            threshold = config.ear_threshold,
            frames = config.consecutive_frames,
            "Creating DMS module"
        );
        Ok(Self {
            detector: DrowsinessDetector::from_config(&config)?,
        })
    }

    /// Analyze a single landmark frame and advance the drowsiness state
    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameAnalysis {
        let openness = match aggregate_frame(frame) {
            Ok(openness) => openness,
            Err(e) => {
                warn!(sequence = frame.sequence, "Discarding frame: {}", e);
                None
            }
        };

        let transition = self.detector.observe(openness);
        let state = self.detector.state();

        match transition {
            AlertTransition::AlertRaised => info!(
                sequence = frame.sequence,
                frames = state.consecutive_low_frames,
                "Drowsiness alert raised"
            ),
            AlertTransition::AlertCleared => info!(sequence = frame.sequence, "Drowsiness alert cleared"),
            AlertTransition::NoChange => debug!(
                sequence = frame.sequence,
                ear = openness.map(|o| o.value()),
                counter = state.consecutive_low_frames,
                "Frame processed"
            ),
        }

        FrameAnalysis::new(frame.sequence, frame.faces.len(), openness, transition, state)
    }

    /// Current detector state
    pub fn state(&self) -> DetectorState {
        self.detector.state()
    }

    /// Underlying state machine
    pub fn detector(&self) -> &DrowsinessDetector {
        &self.detector
    }

    /// Reset driver state (on driver change / new session)
    pub fn reset_state(&mut self) {
        self.detector.reset();
    }
}
