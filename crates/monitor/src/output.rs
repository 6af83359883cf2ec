//! Per-frame output lines
//!
//! Each analysis is written as one JSON object carrying the overlay text
//! next to the raw fields, e.g.
//!
//! ```text
//! {"sequence":3,"faces_detected":1,"openness":0.21,"transition":"AlertRaised","consecutive_low_frames":50,"alert_active":true,"status":"DROWSY ALERT!","ear_text":"EAR: 0.21"}
//! ```

use dms::FrameAnalysis;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct FrameLine<'a> {
    #[serde(flatten)]
    analysis: &'a FrameAnalysis,
    status: &'static str,
    ear_text: String,
}

/// Write one analysis as a JSON line
pub fn write_frame_line<W: Write>(mut writer: W, analysis: &FrameAnalysis) -> io::Result<()> {
    let line = FrameLine {
        analysis,
        status: analysis.status_text(),
        ear_text: analysis.ear_text(),
    };
    serde_json::to_writer(&mut writer, &line)?;
    writeln!(writer)
}
