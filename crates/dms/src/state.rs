//! Drowsiness state machine
//!
//! Debounces per-frame openness with a consecutive-low-frame counter:
//! the alert is raised once the eyes stay below threshold for the
//! configured number of frames, and cleared on the first frame that is
//! above threshold or has no observation.

use serde::{Deserialize, Serialize};
use tracing::trace;
use crate::config::DmsConfig;
use crate::ear::EyeOpenness;
use crate::DmsError;

/// Alert state of the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertState {
    #[default]
    Monitoring,
    Alerting,
}

/// Outcome of a single observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertTransition {
    #[default]
    NoChange,
    AlertRaised,
    AlertCleared,
}

/// Temporal state carried between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectorState {
    /// Consecutive frames immediately preceding with openness below threshold
    pub consecutive_low_frames: u32,
    /// Whether the drowsiness alert is active
    pub alert_active: bool,
}

/// Consecutive-frame drowsiness detector
#[derive(Debug, Clone)]
pub struct DrowsinessDetector {
    threshold: f32,
    frames_required: u32,
    state: DetectorState,
}

impl DrowsinessDetector {
    /// Create a detector in the `Monitoring` state
    pub fn new(threshold: f32, frames_required: u32) -> Result<Self, DmsError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(DmsError::Config(format!(
                "EAR threshold must be a positive number, got {threshold}"
            )));
        }
        if frames_required == 0 {
            return Err(DmsError::Config(
                "consecutive frames required must be at least 1".into(),
            ));
        }

        Ok(Self {
            threshold,
            frames_required,
            state: DetectorState::default(),
        })
    }

    pub fn from_config(config: &DmsConfig) -> Result<Self, DmsError> {
        Self::new(config.ear_threshold, config.consecutive_frames)
    }

    /// Feed the aggregated openness of one frame (`None` = nothing detected)
    pub fn observe(&mut self, observation: Option<EyeOpenness>) -> AlertTransition {
        let closed = matches!(observation, Some(ear) if ear.value() < self.threshold);

        let transition = if closed {
            self.state.consecutive_low_frames = self.state.consecutive_low_frames.saturating_add(1);

            if !self.state.alert_active
                && self.state.consecutive_low_frames >= self.frames_required
            {
                self.state.alert_active = true;
                AlertTransition::AlertRaised
            } else {
                AlertTransition::NoChange
            }
        } else {
            self.state.consecutive_low_frames = 0;

            if self.state.alert_active {
                self.state.alert_active = false;
                AlertTransition::AlertCleared
            } else {
                AlertTransition::NoChange
            }
        };

        trace!(
            ?observation,
            counter = self.state.consecutive_low_frames,
            ?transition,
            "observation"
        );

        transition
    }

    /// Snapshot of the current state
    pub fn state(&self) -> DetectorState {
        self.state
    }

    /// Monitoring or alerting
    pub fn alert_state(&self) -> AlertState {
        if self.state.alert_active {
            AlertState::Alerting
        } else {
            AlertState::Monitoring
        }
    }

    /// EAR below which a frame counts as low
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Consecutive low frames that raise the alert
    pub fn frames_required(&self) -> u32 {
        self.frames_required
    }

    /// Reset state (new session)
    pub fn reset(&mut self) {
        self.state = DetectorState::default();
    }
}
