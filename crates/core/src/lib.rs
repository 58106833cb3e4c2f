//! Plan Area Core Library
//!
//! Calibration, polygon area and view-transform engine for measuring
//! real-world areas on raster floor plans.

pub mod area;
pub mod calibration;
pub mod capture;
pub mod config;
pub mod error;
pub mod geometry;
pub mod prompt;
pub mod session;
pub mod view;

pub use area::{
    format_area, polygon_area_pixels, to_real_area, vertex_centroid, AreaMeasurement,
    MeasurementId, MIN_POLYGON_VERTICES,
};
pub use calibration::{compute_scale, parse_real_length, ScaleCalibration};
pub use capture::{CaptureOutcome, PointCapture, CALIBRATION_POINTS};
pub use config::{ConfigError, MeasureConfig};
pub use error::{MeasureError, MeasureResult};
pub use geometry::{ImagePoint, ImageSize, ScreenPoint};
pub use prompt::{LengthReply, RealLengthPrompt};
pub use session::{ImageHandle, MeasurementSession, Phase, SessionEvent};
pub use view::{ViewState, ViewTransform, ZoomDirection};
