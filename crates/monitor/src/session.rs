//! Monitoring session loop

use alerting::{AlertError, AlertManager, AlertSink};
use dms::{DetectorState, DmsError, DmsModule, FrameAnalysis, LandmarkProvider};
use serde::Serialize;
use std::future::Future;
use thiserror::Error;
use tracing::{error, info};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Provider(#[from] DmsError),

    #[error(transparent)]
    Alert(#[from] AlertError),
}

/// What happened during a session
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Frames processed
    pub frames: u64,
    /// Alerts raised
    pub alerts_raised: usize,
    /// Seconds spent alerting
    pub alert_seconds: f64,
    /// Detector state when the session ended
    pub last_state: DetectorState,
}

/// Process frames in arrival order until the provider runs dry or `shutdown` resolves.
///
/// Every analysis is forwarded to `alerts`, which keeps the sink in line with the
/// detector; the sink is stopped before returning, whatever the outcome. Sink
/// failures during the session are logged and retried on the next frame.
pub async fn run_session<P, S, F>(
    module: &mut DmsModule,
    provider: &mut P,
    alerts: &mut AlertManager<S>,
    shutdown: F,
    mut on_frame: impl FnMut(&FrameAnalysis),
) -> Result<SessionSummary, SessionError>
where
    P: LandmarkProvider,
    S: AlertSink,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut frames = 0u64;

    let result = loop {
        let next = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break Ok(());
            }
            next = provider.next_frame() => next,
        };

        match next {
            Ok(Some(frame)) => {
                let analysis = module.process_frame(&frame);
                frames += 1;

                if let Err(e) = alerts.handle(&analysis) {
                    error!(sequence = analysis.sequence, "Alert output failed: {}", e);
                }
                on_frame(&analysis);
            }
            Ok(None) => {
                info!("Landmark stream ended");
                break Ok(());
            }
            Err(e) => break Err(SessionError::from(e)),
        }
    };

    let stopped = alerts.shutdown();
    result?;
    stopped?;

    let summary = SessionSummary {
        frames,
        alerts_raised: alerts.episodes(),
        alert_seconds: alerts.total_alert_time().as_secs_f64(),
        last_state: module.state(),
    };
    info!(
        frames = summary.frames,
        alerts = summary.alerts_raised,
        alert_seconds = summary.alert_seconds,
        "Session finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alerting::{RecordingSink, SinkEvent};
    use dms::{
        AlertTransition, DmsConfig, EyeContour, FaceLandmarks, LandmarkFrame, Point, StaticProvider,
    };
    use std::future::pending;

    fn eye(ear: f32) -> EyeContour {
        let half = ear * 10.0 / 2.0;
        EyeContour::new([
            Point::new(0.0, 0.0),
            Point::new(3.0, -half),
            Point::new(7.0, -half),
            Point::new(10.0, 0.0),
            Point::new(7.0, half),
            Point::new(3.0, half),
        ])
    }

    fn frames(ears: &[Option<f32>]) -> StaticProvider {
        StaticProvider::new(ears.iter().enumerate().map(|(i, ear)| {
            let faces = ear
                .map(|e| vec![FaceLandmarks::new(eye(e), eye(e))])
                .unwrap_or_default();
            LandmarkFrame::new(i as u64, faces)
        }))
    }

    fn module(frames: u32) -> DmsModule {
        DmsModule::new(DmsConfig {
            ear_threshold: 0.3,
            consecutive_frames: frames,
        })
        .unwrap()
    }

    /// Provider that fails after its frames run out
    struct FailingProvider(StaticProvider);

    impl LandmarkProvider for FailingProvider {
        async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError> {
            match self.0.next_frame().await? {
                Some(frame) => Ok(Some(frame)),
                None => Err(DmsError::Provider("camera unplugged".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_session_drives_sink() {
        let mut dms_module = module(3);
        let mut provider = frames(&[
            Some(0.25), Some(0.28), Some(0.29), Some(0.35), Some(0.2), Some(0.2), Some(0.2),
        ]);
        let mut alerts = AlertManager::new(RecordingSink::new());
        let mut transitions = Vec::new();

        let summary = run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |a| {
            transitions.push(a.transition)
        })
        .await
        .unwrap();

        use dms::AlertTransition::*;
        assert_eq!(
            transitions,
            vec![NoChange, NoChange, AlertRaised, AlertCleared, NoChange, NoChange, AlertRaised]
        );
        assert_eq!(summary.frames, 7);
        assert_eq!(summary.alerts_raised, 2);
        assert!(summary.last_state.alert_active);

        // Alert still active at end of stream is silenced
        assert!(!alerts.sink().is_active());
        assert_eq!(
            alerts.sink().events(),
            &[SinkEvent::Started, SinkEvent::Stopped, SinkEvent::Started, SinkEvent::Stopped]
        );
    }

    /// Sink that fails its first start
    #[derive(Default)]
    struct FlakySink {
        start_calls: usize,
        active: bool,
    }

    impl AlertSink for FlakySink {
        fn start(&mut self) -> Result<(), AlertError> {
            self.start_calls += 1;
            if self.start_calls == 1 {
                return Err(AlertError::Spawn {
                    program: "player".into(),
                    reason: "audio device busy".into(),
                });
            }
            self.active = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AlertError> {
            self.active = false;
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active
        }
    }

    #[tokio::test]
    async fn test_failed_sink_start_recovers_on_next_frame() {
        let mut dms_module = module(2);
        let mut provider = frames(&[Some(0.2), Some(0.2), Some(0.2), Some(0.2)]);
        let mut alerts = AlertManager::new(FlakySink::default());
        let mut sink_active = Vec::new();

        let summary = run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |a| {
            sink_active.push(a.alert_active)
        })
        .await
        .unwrap();

        assert_eq!(sink_active, vec![false, true, true, true]);
        assert_eq!(summary.alerts_raised, 1);
        // Failed on the raising frame, started on the next, held after that
        assert_eq!(alerts.sink().start_calls, 3);
        assert!(!alerts.sink().is_active());
    }

    #[tokio::test]
    async fn test_summary_reports_alert_time() {
        let mut dms_module = module(1);
        let mut provider = frames(&[Some(0.35), Some(0.2), Some(0.2)]);
        let mut alerts = AlertManager::new(RecordingSink::new());

        let summary = run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |_| {})
            .await
            .unwrap();

        // Episode still running at end of stream is closed by shutdown
        assert_eq!(summary.alerts_raised, 1);
        assert!(alerts.current().is_none());
        assert_eq!(summary.alert_seconds, alerts.total_alert_time().as_secs_f64());
    }

    #[tokio::test]
    async fn test_no_alert_no_alert_time() {
        let mut dms_module = module(1);
        let mut provider = frames(&[Some(0.35), Some(0.35)]);
        let mut alerts = AlertManager::new(RecordingSink::new());

        let summary = run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |_| {})
            .await
            .unwrap();

        assert_eq!(summary.alerts_raised, 0);
        assert_eq!(summary.alert_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_missing_face_clears_alert() {
        let mut dms_module = module(2);
        let mut provider = frames(&[Some(0.2), Some(0.2), None, Some(0.2), Some(0.2)]);
        let mut alerts = AlertManager::new(RecordingSink::new());
        let mut analyses = Vec::new();

        run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |a| {
            analyses.push(a.clone())
        })
        .await
        .unwrap();

        assert_eq!(analyses[2].transition, AlertTransition::AlertCleared);
        assert_eq!(analyses[2].faces_detected, 0);
        assert_eq!(analyses[4].transition, AlertTransition::AlertRaised);
    }

    #[tokio::test]
    async fn test_shutdown_stops_before_next_frame() {
        let mut dms_module = module(1);
        let mut provider = frames(&[Some(0.1), Some(0.1)]);
        let mut alerts = AlertManager::new(RecordingSink::new());

        let summary = run_session(&mut dms_module, &mut provider, &mut alerts, async {}, |_| {})
            .await
            .unwrap();

        assert_eq!(summary.frames, 0);
        assert_eq!(provider.remaining(), 2);
    }

    #[tokio::test]
    async fn test_provider_error_ends_session_and_silences_alert() {
        let mut dms_module = module(1);
        let mut provider = FailingProvider(frames(&[Some(0.1)]));
        let mut alerts = AlertManager::new(RecordingSink::new());

        let result = run_session(&mut dms_module, &mut provider, &mut alerts, pending(), |_| {}).await;

        assert!(matches!(result, Err(SessionError::Provider(DmsError::Provider(_)))));
        assert!(!alerts.sink().is_active());
        assert_eq!(alerts.episodes(), 1);
    }
}
