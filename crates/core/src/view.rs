//! Screen ↔ image coordinate transform under pan and zoom
//!
//! The view is a uniform scale followed by a translation:
//! `screen = origin + offset + image * scale`. Zooming keeps the image
//! point under the cursor fixed on screen; panning is anchored at the
//! drag start so repeated move events never accumulate drift.

use crate::config::MeasureConfig;
use crate::geometry::{ImagePoint, ScreenPoint};
use tracing::trace;

/// Current zoom and pan of the view
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewState {
    /// Screen pixels per image pixel
    pub scale: f64,
    /// Horizontal translation relative to the surface origin (screen pixels)
    pub offset_x: f64,
    /// Vertical translation relative to the surface origin (screen pixels)
    pub offset_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

/// Zoom direction of a single wheel notch or button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Direction for a wheel event: scrolling down (positive delta) zooms out
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            ZoomDirection::Out
        } else {
            ZoomDirection::In
        }
    }

    fn sign(self) -> f64 {
        match self {
            ZoomDirection::In => 1.0,
            ZoomDirection::Out => -1.0,
        }
    }
}

/// Offset and pointer position captured when a pan drag starts
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanAnchor {
    offset_x: f64,
    offset_y: f64,
    screen: ScreenPoint,
}

/// Maps between screen and image coordinates and owns zoom/pan behavior
#[derive(Debug, Clone)]
pub struct ViewTransform {
    state: ViewState,
    /// Top-left of the rendering surface in screen coordinates
    origin: ScreenPoint,
    config: MeasureConfig,
    pan_anchor: Option<PanAnchor>,
}

impl ViewTransform {
    /// Create a transform at scale 1 with no offset
    pub fn new(config: MeasureConfig) -> Self {
        Self {
            state: ViewState::default(),
            origin: ScreenPoint::default(),
            config,
            pan_anchor: None,
        }
    }

    /// Current view state
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Current scale
    pub fn scale(&self) -> f64 {
        self.state.scale
    }

    /// Surface origin in screen coordinates
    pub fn origin(&self) -> ScreenPoint {
        self.origin
    }

    /// Update the surface origin (call when the surface moves or resizes)
    pub fn set_origin(&mut self, origin: ScreenPoint) {
        self.origin = origin;
    }

    /// Reset zoom and pan (new image loaded)
    pub fn reset(&mut self) {
        self.state = ViewState::default();
        self.pan_anchor = None;
    }

    /// Convert a screen position to image space
    pub fn screen_to_image(&self, screen: ScreenPoint) -> ImagePoint {
        ImagePoint::new(
            (screen.x - self.origin.x - self.state.offset_x) / self.state.scale,
            (screen.y - self.origin.y - self.state.offset_y) / self.state.scale,
        )
    }

    /// Convert an image-space point to its screen position
    pub fn image_to_screen(&self, point: ImagePoint) -> ScreenPoint {
        ScreenPoint::new(
            self.origin.x + self.state.offset_x + point.x * self.state.scale,
            self.origin.y + self.state.offset_y + point.y * self.state.scale,
        )
    }

    /// Zoom one wheel notch around the cursor
    pub fn zoom(&mut self, cursor: ScreenPoint, direction: ZoomDirection) -> ViewState {
        let factor = 1.0 + direction.sign() * self.config.zoom_intensity;
        self.zoom_by(cursor, factor)
    }

    /// Toolbar zoom in, anchored at `anchor` (usually the surface centre)
    pub fn zoom_in_step(&mut self, anchor: ScreenPoint) -> ViewState {
        let factor = self.config.button_zoom_factor;
        self.zoom_by(anchor, factor)
    }

    /// Toolbar zoom out, anchored at `anchor` (usually the surface centre)
    pub fn zoom_out_step(&mut self, anchor: ScreenPoint) -> ViewState {
        let factor = 1.0 / self.config.button_zoom_factor;
        self.zoom_by(anchor, factor)
    }

    fn zoom_by(&mut self, anchor: ScreenPoint, factor: f64) -> ViewState {
        let old_scale = self.state.scale;
        let new_scale = self.config.clamp_scale(old_scale * factor);
        let ratio = new_scale / old_scale;

        // Anchor relative to the surface so the point under it stays put
        let cx = anchor.x - self.origin.x;
        let cy = anchor.y - self.origin.y;
        self.state = ViewState {
            scale: new_scale,
            offset_x: cx - (cx - self.state.offset_x) * ratio,
            offset_y: cy - (cy - self.state.offset_y) * ratio,
        };

        trace!(
            scale = new_scale,
            offset_x = self.state.offset_x,
            offset_y = self.state.offset_y,
            "zoom"
        );
        self.state
    }

    /// Start a pan drag at the given pointer position
    pub fn begin_pan(&mut self, screen: ScreenPoint) {
        self.pan_anchor = Some(PanAnchor {
            offset_x: self.state.offset_x,
            offset_y: self.state.offset_y,
            screen,
        });
    }

    /// Move the view so the drag-start point follows the pointer.
    ///
    /// Returns `None` when no pan is in progress.
    pub fn pan(&mut self, screen: ScreenPoint) -> Option<ViewState> {
        let anchor = self.pan_anchor?;
        self.state.offset_x = anchor.offset_x - anchor.screen.x + screen.x;
        self.state.offset_y = anchor.offset_y - anchor.screen.y + screen.y;

        trace!(offset_x = self.state.offset_x, offset_y = self.state.offset_y, "pan");
        Some(self.state)
    }

    /// Finish the current pan drag
    pub fn end_pan(&mut self) {
        self.pan_anchor = None;
    }

    /// Whether a pan drag is in progress
    pub fn is_panning(&self) -> bool {
        self.pan_anchor.is_some()
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(MeasureConfig::default())
    }
}
