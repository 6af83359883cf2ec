//! Eye contour and face landmark types

use serde::{Deserialize, Serialize};
use crate::DmsError;

/// Number of points in a single eye contour
pub const EYE_CONTOUR_POINTS: usize = 6;

/// Number of points in the canonical 68-point face shape
pub const FACE_SHAPE_POINTS: usize = 68;

/// Right eye range within the 68-point face shape (subject's right)
const RIGHT_EYE_RANGE: std::ops::Range<usize> = 36..42;

/// Left eye range within the 68-point face shape
const LEFT_EYE_RANGE: std::ops::Range<usize> = 42..48;

/// 2-D image point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Outline of one eye in a single frame.
///
/// Point order follows the 6-point eye scheme:
/// - 0: outer corner, 3: inner corner
/// - 1/5: first upper/lower lid pair
/// - 2/4: second upper/lower lid pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeContour {
    points: [Point; EYE_CONTOUR_POINTS],
}

impl EyeContour {
    pub fn new(points: [Point; EYE_CONTOUR_POINTS]) -> Self {
        Self { points }
    }

    /// Build a contour from raw coordinate pairs
    pub fn from_slice(coords: &[(f32, f32)]) -> Result<Self, DmsError> {
        if coords.len() != EYE_CONTOUR_POINTS {
            return Err(DmsError::InvalidContour {
                expected: EYE_CONTOUR_POINTS,
                actual: coords.len(),
            });
        }

        let mut points = [Point::default(); EYE_CONTOUR_POINTS];
        for (slot, &coord) in points.iter_mut().zip(coords) {
            *slot = coord.into();
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point; EYE_CONTOUR_POINTS] {
        &self.points
    }

    /// Point at index `i` (0..6)
    pub fn point(&self, i: usize) -> Point {
        self.points[i]
    }
}

/// Eye landmarks of one detected face
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceLandmarks {
    pub left_eye: Option<EyeContour>,
    pub right_eye: Option<EyeContour>,
}

impl FaceLandmarks {
    /// Face with both eyes resolved
    pub fn new(left_eye: EyeContour, right_eye: EyeContour) -> Self {
        Self {
            left_eye: Some(left_eye),
            right_eye: Some(right_eye),
        }
    }

    /// Extract both eyes from a 68-point face shape
    pub fn from_shape_68(shape: &[(f32, f32)]) -> Result<Self, DmsError> {
        if shape.len() != FACE_SHAPE_POINTS {
            return Err(DmsError::InvalidContour {
                expected: FACE_SHAPE_POINTS,
                actual: shape.len(),
            });
        }

        Ok(Self::new(
            EyeContour::from_slice(&shape[LEFT_EYE_RANGE])?,
            EyeContour::from_slice(&shape[RIGHT_EYE_RANGE])?,
        ))
    }

    /// Iterate over the eyes that were resolved
    pub fn eyes(&self) -> impl Iterator<Item = &EyeContour> {
        self.left_eye.iter().chain(self.right_eye.iter())
    }
}

/// All landmarks reported for one video frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkFrame {
    /// Frame sequence number
    pub sequence: u64,
    /// Detected faces, in no particular order
    pub faces: Vec<FaceLandmarks>,
}

impl LandmarkFrame {
    pub fn new(sequence: u64, faces: Vec<FaceLandmarks>) -> Self {
        Self { sequence, faces }
    }

    /// Frame in which nothing was detected
    pub fn empty(sequence: u64) -> Self {
        Self {
            sequence,
            faces: Vec::new(),
        }
    }
}
