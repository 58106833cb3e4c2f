//! Ordered point capture for the calibration segment and the measured polygon
//!
//! Points are append-only: they are never edited in place, only pushed or
//! popped from the end of the list that belongs to the active phase.

use crate::geometry::ImagePoint;
use crate::session::Phase;

/// Number of points that make up the calibration segment
pub const CALIBRATION_POINTS: usize = 2;

/// What happened to a captured point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Point appended; `count` is the new length of the target list
    Added { count: usize },
    /// Second calibration point appended; the real length should be requested
    CalibrationComplete,
    /// The phase does not take points, or calibration is already full
    Ignored,
}

/// Point lists for the calibration segment and the measurement polygon
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCapture {
    calibration: Vec<ImagePoint>,
    measurement: Vec<ImagePoint>,
}

impl PointCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calibration segment points (0..=2)
    pub fn calibration_points(&self) -> &[ImagePoint] {
        &self.calibration
    }

    /// Measurement polygon vertices, in click order
    pub fn measurement_points(&self) -> &[ImagePoint] {
        &self.measurement
    }

    /// The two calibration endpoints, once both are placed
    pub fn calibration_segment(&self) -> Option<(ImagePoint, ImagePoint)> {
        match self.calibration.as_slice() {
            [p0, p1] => Some((*p0, *p1)),
            _ => None,
        }
    }

    /// Append a point to the list owned by `phase`.
    ///
    /// Calibration stops accepting points at two; further points are
    /// dropped silently. Measurement has no upper bound.
    pub fn add_point(&mut self, phase: Phase, point: ImagePoint) -> CaptureOutcome {
        match phase {
            Phase::Calibrate => {
                if self.calibration.len() >= CALIBRATION_POINTS {
                    return CaptureOutcome::Ignored;
                }
                self.calibration.push(point);
                if self.calibration.len() == CALIBRATION_POINTS {
                    CaptureOutcome::CalibrationComplete
                } else {
                    CaptureOutcome::Added { count: self.calibration.len() }
                }
            }
            Phase::Measure => {
                self.measurement.push(point);
                CaptureOutcome::Added { count: self.measurement.len() }
            }
            Phase::Upload | Phase::Result => CaptureOutcome::Ignored,
        }
    }

    /// Remove the last point of the list owned by `phase`.
    ///
    /// Returns the removed point, or `None` when the list was empty or the
    /// phase owns no list.
    pub fn undo_last(&mut self, phase: Phase) -> Option<ImagePoint> {
        self.list_mut(phase)?.pop()
    }

    /// Clear the list owned by `phase`
    pub fn reset(&mut self, phase: Phase) {
        if let Some(list) = self.list_mut(phase) {
            list.clear();
        }
    }

    /// Clear both lists
    pub fn clear(&mut self) {
        self.calibration.clear();
        self.measurement.clear();
    }

    fn list_mut(&mut self, phase: Phase) -> Option<&mut Vec<ImagePoint>> {
        match phase {
            Phase::Calibrate => Some(&mut self.calibration),
            Phase::Measure => Some(&mut self.measurement),
            Phase::Upload | Phase::Result => None,
        }
    }
}
