//! Pointer and keyboard routing for the measurement surface
//!
//! This module turns raw input into session actions:
//! - Primary click places a point in the active phase
//! - Middle drag, or Shift + primary drag, pans the view
//! - Mouse wheel zooms around the cursor
//! - Keys go to the length dialog while it is open
//!
//! The handler owns no measurement state; it only forwards to the session
//! and keeps the dialog in step with it.

use crate::length_dialog::LengthDialog;
use plan_area_core::{
    CaptureOutcome, MeasureResult, MeasurementSession, Phase, ScreenPoint, ZoomDirection,
};

/// Mouse button that triggered a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Keyboard modifiers held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
}

/// Keys the measurement surface reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Escape,
    /// Platform undo shortcut (Ctrl+Z / Cmd+Z)
    Undo,
}

/// What a pointer press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// A point was captured
    Placed(CaptureOutcome),
    /// A pan drag started
    PanStarted,
    /// Nothing happened (no image, modal dialog open, or unused button)
    Ignored,
}

/// Routes input events for one measurement surface
#[derive(Debug, Clone)]
pub struct InputHandler {
    dialog: LengthDialog,
    /// Surface position and size (screen pixels)
    surface_origin: ScreenPoint,
    surface_width: f64,
    surface_height: f64,
}

impl InputHandler {
    /// Create a handler for a surface of the given size at the screen origin
    pub fn new(surface_width: f64, surface_height: f64) -> Self {
        Self {
            dialog: LengthDialog::new(),
            surface_origin: ScreenPoint::default(),
            surface_width,
            surface_height,
        }
    }

    /// Update surface placement (call on window move or resize)
    pub fn set_surface(
        &mut self,
        session: &mut MeasurementSession,
        origin: ScreenPoint,
        width: f64,
        height: f64,
    ) {
        self.surface_origin = origin;
        self.surface_width = width;
        self.surface_height = height;
        session.set_surface_origin(origin);
    }

    /// Centre of the surface, the anchor for toolbar zoom
    pub fn surface_center(&self) -> ScreenPoint {
        ScreenPoint::new(
            self.surface_origin.x + self.surface_width / 2.0,
            self.surface_origin.y + self.surface_height / 2.0,
        )
    }

    pub fn dialog(&self) -> &LengthDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut LengthDialog {
        &mut self.dialog
    }

    /// Handle a button press
    pub fn on_pointer_down(
        &mut self,
        session: &mut MeasurementSession,
        position: ScreenPoint,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> PointerAction {
        if self.dialog.is_visible() || session.image().is_none() {
            return PointerAction::Ignored;
        }

        match button {
            PointerButton::Middle => {
                session.begin_pan(position);
                PointerAction::PanStarted
            }
            PointerButton::Primary if modifiers.shift => {
                session.begin_pan(position);
                PointerAction::PanStarted
            }
            PointerButton::Primary => {
                let outcome = session.place_point(position);
                if outcome == CaptureOutcome::CalibrationComplete {
                    self.dialog.sync(session);
                }
                PointerAction::Placed(outcome)
            }
            PointerButton::Secondary => PointerAction::Ignored,
        }
    }

    /// Handle pointer motion (drives panning and the preview edge)
    pub fn on_pointer_move(&mut self, session: &mut MeasurementSession, position: ScreenPoint) {
        session.pointer_moved(position);
    }

    /// Handle a button release; ends any pan drag
    pub fn on_pointer_up(&mut self, session: &mut MeasurementSession) {
        session.end_pan();
    }

    /// Handle one wheel event at the cursor.
    ///
    /// Only the sign of `delta_y` matters: positive scrolls down and zooms out.
    pub fn on_wheel(
        &mut self,
        session: &mut MeasurementSession,
        cursor: ScreenPoint,
        delta_y: f64,
    ) {
        if session.image().is_none() || delta_y == 0.0 {
            return;
        }
        session.zoom(cursor, ZoomDirection::from_wheel_delta(delta_y));
    }

    /// Toolbar zoom in, anchored at the surface centre
    pub fn zoom_in(&mut self, session: &mut MeasurementSession) {
        if session.image().is_some() {
            session.zoom_in_step(self.surface_center());
        }
    }

    /// Toolbar zoom out, anchored at the surface centre
    pub fn zoom_out(&mut self, session: &mut MeasurementSession) {
        if session.image().is_some() {
            session.zoom_out_step(self.surface_center());
        }
    }

    /// Handle a key press.
    ///
    /// With the dialog open every key goes to it. Otherwise Undo and
    /// Backspace remove the last point and Enter closes the polygon.
    pub fn on_key(&mut self, session: &mut MeasurementSession, key: Key) -> MeasureResult<()> {
        if self.dialog.is_visible() {
            self.dialog.handle_key(key, session)?;
            return Ok(());
        }

        match key {
            Key::Undo | Key::Backspace => {
                session.undo_last();
                self.dialog.sync(session);
            }
            Key::Enter if session.phase() == Phase::Measure => {
                session.compute_area()?;
            }
            Key::Enter | Key::Escape | Key::Char(_) => {}
        }
        Ok(())
    }
}
