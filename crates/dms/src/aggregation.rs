//! Per-frame aggregation of eye openness
//!
//! Reduces every eye detected in one frame to a single observation:
//! - per face, the mean of the resolved eyes
//! - across faces, the minimum (worst case)
//!
//! A frame without any resolved eye produces no observation.

use crate::contour::{FaceLandmarks, LandmarkFrame};
use crate::ear::{compute_openness, EyeOpenness};
use crate::DmsError;

/// Openness of a single face, or `None` if neither eye was resolved
pub fn face_openness(face: &FaceLandmarks) -> Result<Option<EyeOpenness>, DmsError> {
    let mut sum = 0.0;
    let mut count = 0u32;

    for eye in face.eyes() {
        sum += compute_openness(eye)?.value();
        count += 1;
    }

    if count == 0 {
        return Ok(None);
    }

    // Finite per-eye ratios can still overflow the sum
    EyeOpenness::new(sum / count as f32)
        .map(Some)
        .ok_or(DmsError::DegenerateGeometry { horizontal: f32::NAN })
}

/// Worst-case openness across all faces of a frame
pub fn aggregate_frame(frame: &LandmarkFrame) -> Result<Option<EyeOpenness>, DmsError> {
    let mut worst: Option<EyeOpenness> = None;

    for face in &frame.faces {
        if let Some(openness) = face_openness(face)? {
            worst = Some(match worst {
                Some(current) => current.min(openness),
                None => openness,
            });
        }
    }

    Ok(worst)
}
