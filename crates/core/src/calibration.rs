//! Two-point scale calibration
//!
//! The user marks both ends of a feature whose real length is known; the
//! pixel length of that segment divided by the real length gives the
//! pixels-per-meter scale used for every later measurement.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::ImagePoint;

/// Parse a user-entered real-world length in meters.
///
/// Accepts surrounding whitespace. Rejects empty, non-numeric, non-finite,
/// zero and negative input with [`MeasureError::InvalidInput`].
pub fn parse_real_length(input: &str) -> MeasureResult<f64> {
    let invalid = || MeasureError::InvalidInput { input: input.to_string() };
    let value = input.trim().parse::<f64>().map_err(|_| invalid())?;
    validate_real_length(value).map_err(|_| invalid())
}

fn validate_real_length(value: f64) -> MeasureResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MeasureError::InvalidInput { input: value.to_string() })
    }
}

/// Compute pixels-per-meter from a calibration segment and its real length.
///
/// Fails with [`MeasureError::InvalidInput`] for a non-finite or
/// non-positive length, or one so small the scale overflows, and with
/// [`MeasureError::DegenerateSegment`] when the endpoints coincide.
pub fn compute_scale(
    p0: ImagePoint,
    p1: ImagePoint,
    real_length_meters: f64,
) -> MeasureResult<f64> {
    let real_length = validate_real_length(real_length_meters)?;

    let pixel_distance = p0.distance_to(&p1);
    if !(pixel_distance.is_finite() && pixel_distance > 0.0) {
        return Err(MeasureError::DegenerateSegment);
    }

    let pixels_per_meter = pixel_distance / real_length;
    if !(pixels_per_meter.is_finite() && pixels_per_meter > 0.0) {
        return Err(MeasureError::InvalidInput { input: real_length.to_string() });
    }
    Ok(pixels_per_meter)
}

/// An established two-point calibration
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScaleCalibration {
    /// First calibration point (image space)
    p0: ImagePoint,
    /// Second calibration point (image space)
    p1: ImagePoint,
    /// Known distance between the points, in meters
    real_length_meters: f64,
    /// Derived scale
    pixels_per_meter: f64,
}

impl ScaleCalibration {
    /// Create a calibration from a segment and its real length
    pub fn new(p0: ImagePoint, p1: ImagePoint, real_length_meters: f64) -> MeasureResult<Self> {
        let pixels_per_meter = compute_scale(p0, p1, real_length_meters)?;
        Ok(Self {
            p0,
            p1,
            real_length_meters,
            pixels_per_meter,
        })
    }

    /// Segment endpoints
    pub fn segment(&self) -> (ImagePoint, ImagePoint) {
        (self.p0, self.p1)
    }

    /// Known real length of the segment, in meters
    pub fn real_length_meters(&self) -> f64 {
        self.real_length_meters
    }

    /// Length of the segment in image pixels
    pub fn pixel_length(&self) -> f64 {
        self.p0.distance_to(&self.p1)
    }

    /// Image pixels per real-world meter
    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Convert an image-space distance to meters
    pub fn to_meters(&self, pixel_distance: f64) -> f64 {
        pixel_distance / self.pixels_per_meter
    }

    /// Convert meters to an image-space distance
    pub fn to_pixels(&self, meters: f64) -> f64 {
        meters * self.pixels_per_meter
    }
}
