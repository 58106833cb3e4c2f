//! Errors raised by the measurement engine
//!
//! Every error is recoverable: it blocks the attempted transition, leaves
//! the session untouched and is surfaced to the user as a warning.

use crate::session::Phase;

/// Errors that can occur while calibrating or measuring
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// The real-world length is empty, not a number, non-finite or not positive
    #[error("invalid real-world length: {input:?}")]
    InvalidInput { input: String },

    /// Not enough vertices to close a polygon
    #[error("polygon needs at least {required} points, got {actual}")]
    InsufficientVertices { required: usize, actual: usize },

    /// No usable pixels-per-meter scale
    #[error("scale is not set")]
    ScaleNotSet,

    /// Both calibration points sit on the same pixel
    #[error("calibration points coincide")]
    DegenerateSegment,

    /// The polygon area overflows when converted to a number
    #[error("area is too large to represent")]
    NonFiniteArea,

    /// A real length was supplied before both calibration points were placed
    #[error("calibration segment needs 2 points, got {actual}")]
    CalibrationIncomplete { actual: usize },

    /// The action is not accepted in the current phase
    #[error("action requires {expected:?} phase, session is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
}

impl MeasureError {
    /// Warning text shown to the user when a transition is rejected
    pub fn user_message(&self) -> &'static str {
        match self {
            MeasureError::InvalidInput { .. } => "Please enter a valid positive length.",
            MeasureError::InsufficientVertices { .. } => {
                "At least 3 points are needed to close an area."
            }
            MeasureError::ScaleNotSet => "Set the scale before measuring.",
            MeasureError::DegenerateSegment => {
                "The two calibration points are identical. Pick two distinct points."
            }
            MeasureError::NonFiniteArea => "The measured area is too large to compute.",
            MeasureError::CalibrationIncomplete { .. } => {
                "Place both calibration points before entering a length."
            }
            MeasureError::WrongPhase { .. } => "This action is not available right now.",
        }
    }
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasureError::InvalidInput { input: "abc".to_string() };
        assert_eq!(err.to_string(), "invalid real-world length: \"abc\"");

        let err = MeasureError::InsufficientVertices { required: 3, actual: 2 };
        assert_eq!(err.to_string(), "polygon needs at least 3 points, got 2");

        let err = MeasureError::WrongPhase { expected: Phase::Measure, actual: Phase::Upload };
        assert_eq!(err.to_string(), "action requires Measure phase, session is in Upload");
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            MeasureError::InvalidInput { input: String::new() },
            MeasureError::InsufficientVertices { required: 3, actual: 0 },
            MeasureError::ScaleNotSet,
            MeasureError::DegenerateSegment,
            MeasureError::NonFiniteArea,
            MeasureError::CalibrationIncomplete { actual: 1 },
            MeasureError::WrongPhase { expected: Phase::Measure, actual: Phase::Result },
        ];

        for (i, a) in errors.iter().enumerate() {
            for b in errors.iter().skip(i + 1) {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
