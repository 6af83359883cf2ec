//! Eye Aspect Ratio (EAR) estimation

use serde::{Deserialize, Serialize};
use crate::contour::EyeContour;
use crate::DmsError;

/// Eye openness ratio (EAR). Roughly 0.3 for an open eye, near 0 when closed.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EyeOpenness(f32);

impl EyeOpenness {
    /// Wrap an already computed ratio. Negative and non-finite values are rejected.
    pub fn new(value: f32) -> Option<Self> {
        (value.is_finite() && value >= 0.0).then_some(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Smaller of two openness values
    pub fn min(self, other: Self) -> Self {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

/// Compute the eye aspect ratio of a contour:
///
/// ```text
/// EAR = (|p1 - p5| + |p2 - p4|) / (2 * |p0 - p3|)
/// ```
///
/// Fails with [`DmsError::DegenerateGeometry`] when the corner distance is zero
/// or the coordinates do not produce a finite ratio.
pub fn compute_openness(contour: &EyeContour) -> Result<EyeOpenness, DmsError> {
    let p = contour.points();

    let vertical1 = p[1].distance(&p[5]);
    let vertical2 = p[2].distance(&p[4]);
    let horizontal = p[0].distance(&p[3]);

    if horizontal == 0.0 {
        return Err(DmsError::DegenerateGeometry { horizontal });
    }

    let ear = (vertical1 + vertical2) / (2.0 * horizontal);
    EyeOpenness::new(ear).ok_or(DmsError::DegenerateGeometry { horizontal })
}
