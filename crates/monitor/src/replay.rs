//! JSON-lines landmark replay
//!
//! One object per line, as written by an external face/landmark detector:
//!
//! ```text
//! {"sequence": 12, "faces": [{"left_eye": [[x, y], ...], "right_eye": [[x, y], ...]}]}
//! {"faces": [{"shape": [[x, y], ... 68 points]}]}
//! {"faces": []}
//! ```
//!
//! Missing sequence numbers continue from the previous frame.

use dms::{DmsError, EyeContour, FaceLandmarks, LandmarkFrame, LandmarkProvider};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    sequence: Option<u64>,
    #[serde(default)]
    faces: Vec<FaceRecord>,
}

#[derive(Debug, Deserialize)]
struct ShapeRecord {
    shape: Vec<(f32, f32)>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EyesRecord {
    #[serde(default)]
    left_eye: Option<Vec<(f32, f32)>>,
    #[serde(default)]
    right_eye: Option<Vec<(f32, f32)>>,
}

/// A face is either a full 68-point shape or explicit eye contours. A
/// malformed shape must not fall through to an eyeless face.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FaceRecord {
    Shape(ShapeRecord),
    Eyes(EyesRecord),
}

impl FaceRecord {
    fn into_landmarks(self) -> Result<FaceLandmarks, DmsError> {
        match self {
            FaceRecord::Shape(ShapeRecord { shape }) => FaceLandmarks::from_shape_68(&shape),
            FaceRecord::Eyes(EyesRecord { left_eye, right_eye }) => Ok(FaceLandmarks {
                left_eye: left_eye.as_deref().map(EyeContour::from_slice).transpose()?,
                right_eye: right_eye.as_deref().map(EyeContour::from_slice).transpose()?,
            }),
        }
    }
}

/// Replays recorded landmark frames from a line-oriented reader
pub struct ReplayProvider<R> {
    lines: Lines<R>,
    line_number: usize,
    next_sequence: u64,
}

impl<R: AsyncBufRead + Unpin> ReplayProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            next_sequence: 0,
        }
    }

    fn parse(&mut self, line: &str) -> Result<LandmarkFrame, DmsError> {
        let record: FrameRecord = serde_json::from_str(line)
            .map_err(|e| DmsError::Provider(format!("line {}: {}", self.line_number, e)))?;

        let faces = record
            .faces
            .into_iter()
            .map(FaceRecord::into_landmarks)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DmsError::Provider(format!("line {}: {}", self.line_number, e)))?;

        let sequence = record.sequence.unwrap_or(self.next_sequence);
        self.next_sequence = sequence.wrapping_add(1);

        Ok(LandmarkFrame::new(sequence, faces))
    }
}

/// Boxed reader used by [`open`]
pub type DynReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open a replay source: `-` for stdin, otherwise a file path
pub async fn open(input: &str) -> std::io::Result<ReplayProvider<DynReader>> {
    let reader: DynReader = if input == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        Box::new(BufReader::new(tokio::fs::File::open(input).await?))
    };
    Ok(ReplayProvider::new(reader))
}

impl<R: AsyncBufRead + Unpin + Send> LandmarkProvider for ReplayProvider<R> {
    async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError> {
        loop {
            let line = self
                .lines
                .next_line()
                .await
                .map_err(|e| DmsError::Provider(e.to_string()))?;
            self.line_number += 1;

            let Some(line) = line else {
                debug!(lines = self.line_number - 1, "Replay finished");
                return Ok(None);
            };

            if line.trim().is_empty() {
                continue;
            }

            return self.parse(&line).map(Some);
        }
    }
}
