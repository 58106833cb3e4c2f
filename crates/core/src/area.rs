//! Polygon area in image pixels and real-world square meters
//!
//! Polygons are implicitly closed: the last vertex connects back to the
//! first, so callers never repeat the first point. Self-intersecting
//! polygons are not rejected; the shoelace sum still yields a number, but
//! it is not the area of a simple shape.

use crate::error::{MeasureError, MeasureResult};
use crate::geometry::ImagePoint;

/// Unique identifier for a computed area
pub type MeasurementId = uuid::Uuid;

/// Minimum number of vertices for a closed polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Unsigned area of a closed polygon in square pixels (shoelace formula).
///
/// The result does not depend on vertex orientation or on which vertex
/// comes first.
pub fn polygon_area_pixels(points: &[ImagePoint]) -> MeasureResult<f64> {
    let n = points.len();
    if n < MIN_POLYGON_VERTICES {
        return Err(MeasureError::InsufficientVertices {
            required: MIN_POLYGON_VERTICES,
            actual: n,
        });
    }

    let mut twice_signed = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_signed += points[i].x * points[j].y;
        twice_signed -= points[j].x * points[i].y;
    }

    Ok((twice_signed / 2.0).abs())
}

/// Convert square pixels to square meters.
///
/// Area scales with the square of the linear scale. A missing, zero or
/// non-finite scale is [`MeasureError::ScaleNotSet`].
pub fn to_real_area(area_pixels: f64, pixels_per_meter: Option<f64>) -> MeasureResult<f64> {
    let ppm = usable_scale(pixels_per_meter).ok_or(MeasureError::ScaleNotSet)?;
    Ok(area_pixels / (ppm * ppm))
}

/// The scale, if it can be used for conversion
pub fn usable_scale(pixels_per_meter: Option<f64>) -> Option<f64> {
    pixels_per_meter.filter(|ppm| ppm.is_finite() && *ppm > 0.0)
}

/// Mean of the vertices, used to anchor the area label
pub fn vertex_centroid(points: &[ImagePoint]) -> Option<ImagePoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Some(ImagePoint::new(sum_x / n, sum_y / n))
}

/// Format an area in square meters with at most `fraction_digits`
/// fraction digits, trailing zeros trimmed.
pub fn format_area(area_square_meters: f64, fraction_digits: usize) -> String {
    let mut number = format!("{:.*}", fraction_digits, area_square_meters);
    if number.contains('.') {
        let trimmed = number.trim_end_matches('0').trim_end_matches('.').len();
        number.truncate(trimmed);
    }
    if number == "-0" {
        number = "0".to_string();
    }
    format!("{number} m²")
}

/// A computed area with the inputs that produced it
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AreaMeasurement {
    id: MeasurementId,
    vertices: Vec<ImagePoint>,
    area_pixels: f64,
    area_square_meters: f64,
    pixels_per_meter: f64,
}

impl AreaMeasurement {
    /// Measure a polygon against a scale.
    ///
    /// Vertex count is checked before the scale, so an incomplete polygon
    /// reports [`MeasureError::InsufficientVertices`] even when uncalibrated.
    /// An area that overflows either unit is [`MeasureError::NonFiniteArea`].
    pub fn compute(vertices: &[ImagePoint], pixels_per_meter: Option<f64>) -> MeasureResult<Self> {
        let area_pixels = polygon_area_pixels(vertices)?;
        let ppm = usable_scale(pixels_per_meter).ok_or(MeasureError::ScaleNotSet)?;
        let area_square_meters = to_real_area(area_pixels, Some(ppm))?;
        if !(area_pixels.is_finite() && area_square_meters.is_finite()) {
            return Err(MeasureError::NonFiniteArea);
        }

        Ok(Self {
            id: MeasurementId::new_v4(),
            vertices: vertices.to_vec(),
            area_pixels,
            area_square_meters,
            pixels_per_meter: ppm,
        })
    }

    /// Unique id of this result
    pub fn id(&self) -> MeasurementId {
        self.id
    }

    /// Polygon vertices the area was computed from
    pub fn vertices(&self) -> &[ImagePoint] {
        &self.vertices
    }

    /// Area in square image pixels
    pub fn area_pixels(&self) -> f64 {
        self.area_pixels
    }

    /// Area in square meters
    pub fn area_square_meters(&self) -> f64 {
        self.area_square_meters
    }

    /// Scale used for the conversion
    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// Human-readable area, e.g. `12.35 m²`
    pub fn label(&self, fraction_digits: usize) -> String {
        format_area(self.area_square_meters, fraction_digits)
    }

    /// Where the label should be drawn (image space)
    pub fn label_position(&self) -> ImagePoint {
        vertex_centroid(&self.vertices).unwrap_or_default()
    }
}
