//! Landmark provider seam

use std::collections::VecDeque;
use std::future::Future;
use crate::contour::LandmarkFrame;
use crate::DmsError;

/// Source of per-frame eye landmarks (face/landmark model, recorded stream, ...)
pub trait LandmarkProvider {
    /// Next frame in arrival order, or `Ok(None)` at end of stream
    fn next_frame(&mut self) -> impl Future<Output = Result<Option<LandmarkFrame>, DmsError>> + Send;
}

/// In-memory provider over a fixed list of frames
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    frames: VecDeque<LandmarkFrame>,
}

impl StaticProvider {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl LandmarkProvider for StaticProvider {
    async fn next_frame(&mut self) -> Result<Option<LandmarkFrame>, DmsError> {
        Ok(self.frames.pop_front())
    }
}
