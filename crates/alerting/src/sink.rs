//! Alert sinks
//!
//! A sink owns the user-facing side of the alert (sound, warning text).
//! Starting an active sink or stopping an idle one is a no-op.

use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};
use crate::AlertError;

/// Output for the drowsiness alert
pub trait AlertSink {
    /// Start the alert (e.g. loop an audio cue). No-op when already active.
    fn start(&mut self) -> Result<(), AlertError>;

    /// Stop the alert. No-op when not active.
    fn stop(&mut self) -> Result<(), AlertError>;

    /// Whether the alert is currently playing/shown
    fn is_active(&self) -> bool;
}

impl<S: AlertSink + ?Sized> AlertSink for Box<S> {
    fn start(&mut self) -> Result<(), AlertError> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<(), AlertError> {
        (**self).stop()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Visual warning through the log
#[derive(Debug, Default)]
pub struct LogSink {
    active: bool,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertSink for LogSink {
    fn start(&mut self) -> Result<(), AlertError> {
        if !self.active {
            warn!("You are Sleepy!!");
            self.active = true;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlertError> {
        if self.active {
            info!("Driver alert again");
            self.active = false;
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Plays the alert through an external command (e.g. `mpv --loop alert.wav`).
///
/// The child process is killed when the alert stops. Looping is up to the
/// command; a child that exits on its own is restarted on the next `start`.
#[derive(Debug)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
    launches: usize,
}

impl CommandSink {
    /// Create from a command line, program first
    pub fn new(command: &[String]) -> Result<Self, AlertError> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| AlertError::Config("alert command is empty".into()))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            child: None,
            launches: 0,
        })
    }

    /// Times the command has been spawned
    pub fn launches(&self) -> usize {
        self.launches
    }

    /// Drop the handle of a child that already exited
    fn reap(&mut self) {
        if let Some(child) = &mut self.child {
            match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "Alert command exited");
                    self.child = None;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Failed to poll alert command: {}", e);
                    self.child = None;
                }
            }
        }
    }
}

impl AlertSink for CommandSink {
    fn start(&mut self) -> Result<(), AlertError> {
        self.reap();
        if self.child.is_some() {
            return Ok(());
        }

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AlertError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        self.launches += 1;
        info!(program = %self.program, pid = child.id(), "Alert command started");
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlertError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        // Already exited is fine, kill only fails then
        if let Err(e) = child.kill() {
            debug!("Alert command kill: {}", e);
        }
        child
            .wait()
            .map_err(|e| AlertError::Stop(e.to_string()))?;

        info!(program = %self.program, "Alert command stopped");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.child.is_some()
    }
}

impl Drop for CommandSink {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop alert command: {}", e);
        }
    }
}

/// Sink call recorded by [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    Started,
    Stopped,
}

/// Records effective start/stop calls
#[derive(Debug, Default)]
pub struct RecordingSink {
    active: bool,
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }
}

impl AlertSink for RecordingSink {
    fn start(&mut self) -> Result<(), AlertError> {
        if !self.active {
            self.active = true;
            self.events.push(SinkEvent::Started);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AlertError> {
        if self.active {
            self.active = false;
            self.events.push(SinkEvent::Stopped);
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_idempotent() {
        let mut sink = LogSink::new();
        sink.stop().unwrap();
        assert!(!sink.is_active());

        sink.start().unwrap();
        sink.start().unwrap();
        assert!(sink.is_active());

        sink.stop().unwrap();
        assert!(!sink.is_active());
    }

    #[test]
    fn test_recording_sink_ignores_repeats() {
        let mut sink = RecordingSink::new();
        sink.start().unwrap();
        sink.start().unwrap();
        sink.stop().unwrap();
        sink.stop().unwrap();

        assert_eq!(sink.events(), &[SinkEvent::Started, SinkEvent::Stopped]);
    }

    #[test]
    fn test_command_sink_empty_command() {
        assert!(matches!(CommandSink::new(&[]), Err(AlertError::Config(_))));
    }

    #[test]
    fn test_command_sink_missing_program() {
        let mut sink = CommandSink::new(&["definitely-not-an-alert-player".to_string()]).unwrap();
        assert!(matches!(sink.start(), Err(AlertError::Spawn { .. })));
        assert!(!sink.is_active());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_sink_start_stop() {
        let command = vec!["sleep".to_string(), "30".to_string()];
        let mut sink = CommandSink::new(&command).unwrap();

        sink.start().unwrap();
        assert!(sink.is_active());
        sink.start().unwrap();

        sink.stop().unwrap();
        assert!(!sink.is_active());
        sink.stop().unwrap();
        assert_eq!(sink.launches(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_sink_relaunches_exited_command() {
        let mut sink = CommandSink::new(&["true".to_string()]).unwrap();
        sink.start().unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while sink.child.as_mut().map_or(false, |c| matches!(c.try_wait(), Ok(None))) {
            assert!(std::time::Instant::now() < deadline, "command did not exit");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        sink.start().unwrap();
        assert_eq!(sink.launches(), 2);
        sink.stop().unwrap();
    }
}
