//! Real-length input dialog
//!
//! Modal text field shown once the calibration segment is complete.
//! Accepts digits and a single decimal point; Enter confirms, Escape
//! cancels. A rejected value keeps the dialog open with a warning and
//! leaves the calibration points in place.

use crate::input::Key;
use plan_area_core::{MeasureResult, MeasurementSession};

/// Unit shown next to the input field
pub const LENGTH_UNIT: &str = "m";

/// Longest accepted input
const MAX_INPUT_LEN: usize = 16;

/// What a key press did to the dialog
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogOutcome {
    /// Still open (editing, or the value was rejected)
    Open,
    /// Scale set; the dialog closed
    Confirmed { pixels_per_meter: f64 },
    /// Dismissed; the calibration segment was cleared
    Cancelled,
}

/// State of the real-length dialog
#[derive(Debug, Clone, Default)]
pub struct LengthDialog {
    visible: bool,
    input: String,
    /// Length of the segment being calibrated, in image pixels
    pixel_length: f64,
    error: Option<&'static str>,
}

impl LengthDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog for a segment of `pixel_length` image pixels
    pub fn show(&mut self, pixel_length: f64) {
        self.visible = true;
        self.input.clear();
        self.error = None;
        self.pixel_length = pixel_length;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.input.clear();
        self.error = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn pixel_length(&self) -> f64 {
        self.pixel_length
    }

    /// Warning from the last rejected submission
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Reference line shown under the input field
    pub fn segment_summary(&self) -> String {
        format!("Segment length: {:.1} px", self.pixel_length)
    }

    /// Append a character (only digits and one decimal point)
    pub fn append_char(&mut self, c: char) {
        if self.input.len() >= MAX_INPUT_LEN {
            return;
        }
        let should_append = c.is_ascii_digit() || (c == '.' && !self.input.contains('.'));
        if should_append {
            self.input.push(c);
            self.error = None;
        }
    }

    /// Remove the last character
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Open or close to match whether the session is waiting for a length
    pub fn sync(&mut self, session: &MeasurementSession) {
        match (session.is_awaiting_real_length(), self.visible) {
            (true, false) => {
                let pixel_length = session
                    .calibration_segment_length()
                    .unwrap_or_default();
                self.show(pixel_length);
            }
            (false, true) => self.hide(),
            _ => {}
        }
    }

    /// Submit the current input to the session
    pub fn submit(&mut self, session: &mut MeasurementSession) -> MeasureResult<f64> {
        match session.confirm_real_length(&self.input) {
            Ok(pixels_per_meter) => {
                self.hide();
                Ok(pixels_per_meter)
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Dismiss the dialog and drop the calibration segment
    pub fn cancel(&mut self, session: &mut MeasurementSession) -> MeasureResult<()> {
        self.hide();
        session.cancel_real_length()
    }

    /// Route a key press while the dialog is open
    pub fn handle_key(
        &mut self,
        key: Key,
        session: &mut MeasurementSession,
    ) -> MeasureResult<DialogOutcome> {
        match key {
            Key::Char(c) => self.append_char(c),
            Key::Backspace => self.backspace(),
            Key::Enter => {
                let pixels_per_meter = self.submit(session)?;
                return Ok(DialogOutcome::Confirmed { pixels_per_meter });
            }
            Key::Escape => {
                self.cancel(session)?;
                return Ok(DialogOutcome::Cancelled);
            }
            Key::Undo => {}
        }
        Ok(DialogOutcome::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_area_core::{ImageHandle, MeasureError, Phase, ScreenPoint};

    fn awaiting_session() -> MeasurementSession {
        let mut session = MeasurementSession::default();
        session.load_image(ImageHandle::new(1, 200, 200));
        session.place_point(ScreenPoint::new(0.0, 0.0));
        session.place_point(ScreenPoint::new(0.0, 150.0));
        session
    }

    fn typed(dialog: &mut LengthDialog, text: &str) {
        for c in text.chars() {
            dialog.append_char(c);
        }
    }

    #[test]
    fn test_input_filters_characters() {
        let mut dialog = LengthDialog::new();
        dialog.show(100.0);
        typed(&mut dialog, "1a2.3.4-");
        assert_eq!(dialog.input(), "12.34");

        dialog.backspace();
        assert_eq!(dialog.input(), "12.3");
        dialog.clear_input();
        dialog.backspace();
        assert_eq!(dialog.input(), "");
    }

    #[test]
    fn test_input_length_is_capped() {
        let mut dialog = LengthDialog::new();
        typed(&mut dialog, &"9".repeat(40));
        assert_eq!(dialog.input().len(), MAX_INPUT_LEN);
    }

    #[test]
    fn test_show_resets_input() {
        let mut dialog = LengthDialog::new();
        dialog.show(10.0);
        typed(&mut dialog, "5");
        dialog.show(42.0);
        assert!(dialog.is_visible());
        assert_eq!(dialog.input(), "");
        assert_eq!(dialog.segment_summary(), "Segment length: 42.0 px");
    }

    #[test]
    fn test_sync_follows_session() {
        let mut session = awaiting_session();
        let mut dialog = LengthDialog::new();

        dialog.sync(&session);
        assert!(dialog.is_visible());
        assert_eq!(dialog.pixel_length(), 150.0);

        session.undo_last();
        dialog.sync(&session);
        assert!(!dialog.is_visible());
    }

    #[test]
    fn test_enter_confirms() {
        let mut session = awaiting_session();
        let mut dialog = LengthDialog::new();
        dialog.sync(&session);

        for c in "7.5".chars() {
            dialog.handle_key(Key::Char(c), &mut session).unwrap();
        }
        let outcome = dialog.handle_key(Key::Enter, &mut session).unwrap();

        assert_eq!(outcome, DialogOutcome::Confirmed { pixels_per_meter: 20.0 });
        assert!(!dialog.is_visible());
        assert_eq!(session.phase(), Phase::Measure);
    }

    #[test]
    fn test_rejected_value_keeps_dialog_open() {
        let mut session = awaiting_session();
        let mut dialog = LengthDialog::new();
        dialog.sync(&session);

        typed(&mut dialog, ".");
        let err = dialog.handle_key(Key::Enter, &mut session).unwrap_err();

        assert_eq!(err, MeasureError::InvalidInput { input: ".".to_string() });
        assert!(dialog.is_visible());
        assert_eq!(dialog.error(), Some("Please enter a valid positive length."));
        assert_eq!(session.calibration_points().len(), 2);

        // Typing clears the warning
        dialog.append_char('2');
        assert_eq!(dialog.error(), None);
    }

    #[test]
    fn test_escape_cancels() {
        let mut session = awaiting_session();
        let mut dialog = LengthDialog::new();
        dialog.sync(&session);

        let outcome = dialog.handle_key(Key::Escape, &mut session).unwrap();
        assert_eq!(outcome, DialogOutcome::Cancelled);
        assert!(!dialog.is_visible());
        assert!(session.calibration_points().is_empty());
        assert_eq!(session.phase(), Phase::Calibrate);
    }
}
