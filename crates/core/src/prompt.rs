//! Real-length input collaborator
//!
//! Once the calibration segment is complete the session needs a number
//! from the user. Hosts with a blocking prompt implement
//! [`RealLengthPrompt`]; hosts with a modal text field call
//! [`MeasurementSession::confirm_real_length`] and
//! [`MeasurementSession::cancel_real_length`] directly.
//!
//! [`MeasurementSession::confirm_real_length`]: crate::MeasurementSession::confirm_real_length
//! [`MeasurementSession::cancel_real_length`]: crate::MeasurementSession::cancel_real_length

/// Answer from the user to a real-length request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthReply {
    /// Raw text the user entered, not yet validated
    Entered(String),
    /// The user dismissed the prompt
    Cancelled,
}

/// Synchronous prompt for the real length of the calibration segment
pub trait RealLengthPrompt {
    /// Ask for the real length, in meters, of a segment that is
    /// `pixel_length` image pixels long.
    fn request_real_length(&mut self, pixel_length: f64) -> LengthReply;
}

impl<F> RealLengthPrompt for F
where
    F: FnMut(f64) -> LengthReply,
{
    fn request_real_length(&mut self, pixel_length: f64) -> LengthReply {
        self(pixel_length)
    }
}
