//! Alert Manager Implementation

use dms::{AlertTransition, FrameAnalysis};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use crate::sink::AlertSink;
use crate::AlertError;

/// Alert output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// External command that plays the alert sound, program first.
    /// When unset, the alert is only logged.
    pub command: Option<Vec<String>>,
}

/// State of the current alert episode
#[derive(Debug, Clone)]
pub struct AlertState {
    /// When the alert was raised
    pub raised_at: Instant,
    /// Episode number (1-based)
    pub episode: usize,
}

/// Routes detector transitions to an alert sink
pub struct AlertManager<S: AlertSink> {
    sink: S,
    /// Active episode, if any
    current: Option<AlertState>,
    /// Alerts raised so far
    episodes: usize,
    /// Total time spent alerting in finished episodes
    total_alert_time: Duration,
}

impl<S: AlertSink> AlertManager<S> {
    /// Create a new alert manager
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            current: None,
            episodes: 0,
            total_alert_time: Duration::ZERO,
        }
    }

    /// Apply one frame's analysis to the sink.
    ///
    /// The sink follows `alert_active` on every frame, so a failed or finished
    /// cue is started again on the next frame of the same episode. Episodes are
    /// counted from the transition, whether or not the sink succeeded.
    pub fn handle(&mut self, analysis: &FrameAnalysis) -> Result<(), AlertError> {
        match analysis.transition {
            AlertTransition::AlertRaised => self.begin_episode(),
            AlertTransition::AlertCleared => self.end_episode(),
            AlertTransition::NoChange => {}
        }

        if analysis.alert_active {
            self.sink.start()
        } else {
            self.sink.stop()
        }
    }

    fn begin_episode(&mut self) {
        if self.current.is_some() {
            debug!("Alert already active");
            return;
        }

        self.episodes += 1;
        self.current = Some(AlertState {
            raised_at: Instant::now(),
            episode: self.episodes,
        });
        info!("Alert raised (episode {})", self.episodes);
    }

    fn end_episode(&mut self) {
        if let Some(state) = self.current.take() {
            let duration = state.raised_at.elapsed();
            self.total_alert_time += duration;
            info!(
                "Alert cleared (episode {}, {:.1}s)",
                state.episode,
                duration.as_secs_f32()
            );
        }
    }

    /// Stop any active alert (end of session)
    pub fn shutdown(&mut self) -> Result<(), AlertError> {
        self.end_episode();
        self.sink.stop()
    }

    /// Running episode, if any
    pub fn current(&self) -> Option<&AlertState> {
        self.current.as_ref()
    }

    /// Number of alerts raised
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Time spent alerting, including the running episode
    pub fn total_alert_time(&self) -> Duration {
        self.total_alert_time
            + self
                .current
                .as_ref()
                .map(|s| s.raised_at.elapsed())
                .unwrap_or_default()
    }

    /// Underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
