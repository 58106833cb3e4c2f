//! Measurement session state machine
//!
//! One owned session object drives the whole workflow:
//!
//! ```text
//! Upload ──image──▶ Calibrate ──length ok──▶ Measure ──area──▶ Result
//!                      ▲                       ▲  │               │
//!                      └──── redo calibration ─┘  └─ measure again┘
//! ```
//!
//! Any phase can be reset back to Upload. Every transition validates
//! before it mutates, so a rejected action leaves the session exactly as
//! it was. Accepted transitions push [`SessionEvent`]s which the host
//! drains with [`MeasurementSession::take_events`] to decide when to
//! re-render.

use crate::area::{usable_scale, AreaMeasurement, MeasurementId};
use crate::calibration::{parse_real_length, ScaleCalibration};
use crate::capture::{CaptureOutcome, PointCapture};
use crate::config::MeasureConfig;
use crate::error::{MeasureError, MeasureResult};
use crate::geometry::{ImagePoint, ImageSize, ScreenPoint};
use crate::prompt::{LengthReply, RealLengthPrompt};
use crate::view::{ViewState, ViewTransform, ZoomDirection};
use tracing::{debug, info, warn};

/// Workflow step; gates which point list receives clicks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum Phase {
    /// No image loaded
    #[default]
    Upload,
    /// Placing the two calibration points and entering their real length
    Calibrate,
    /// Tracing the polygon
    Measure,
    /// Area computed and displayed
    Result,
}

/// A decoded image handed over by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    /// Host-side texture or bitmap identifier
    pub id: u64,
    /// Intrinsic pixel dimensions
    pub size: ImageSize,
}

impl ImageHandle {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self {
            id,
            size: ImageSize::new(width, height),
        }
    }
}

/// Notification that the session changed and the view should be redrawn
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ImageLoaded { size: ImageSize },
    PointAdded { phase: Phase, point: ImagePoint },
    PointRemoved { phase: Phase, point: ImagePoint },
    /// The calibration segment is complete; ask the user for its length
    RealLengthRequested { pixel_length: f64 },
    Calibrated { pixels_per_meter: f64 },
    CalibrationCancelled,
    /// Every point of the phase's list was dropped at once
    PointsCleared { phase: Phase },
    PhaseChanged { from: Phase, to: Phase },
    AreaComputed { id: MeasurementId, area_square_meters: f64 },
    ViewChanged(ViewState),
    CursorMoved,
    Reset,
}

/// The interactive calibration and measurement session
#[derive(Debug, Clone)]
pub struct MeasurementSession {
    config: MeasureConfig,
    phase: Phase,
    image: Option<ImageHandle>,
    view: ViewTransform,
    capture: PointCapture,
    calibration: Option<ScaleCalibration>,
    awaiting_real_length: bool,
    result: Option<AreaMeasurement>,
    cursor: Option<ScreenPoint>,
    events: Vec<SessionEvent>,
}

impl MeasurementSession {
    /// Create an empty session in the Upload phase
    pub fn new(config: MeasureConfig) -> Self {
        Self {
            view: ViewTransform::new(config.clone()),
            config,
            phase: Phase::Upload,
            image: None,
            capture: PointCapture::new(),
            calibration: None,
            awaiting_real_length: false,
            result: None,
            cursor: None,
            events: Vec::new(),
        }
    }

    // --- state accessors -------------------------------------------------

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn view_state(&self) -> ViewState {
        self.view.state()
    }

    pub fn calibration_points(&self) -> &[ImagePoint] {
        self.capture.calibration_points()
    }

    pub fn measurement_points(&self) -> &[ImagePoint] {
        self.capture.measurement_points()
    }

    /// Pixel length of the calibration segment, once both points are placed
    pub fn calibration_segment_length(&self) -> Option<f64> {
        self.capture.calibration_segment().map(|(p0, p1)| p0.distance_to(&p1))
    }

    pub fn calibration(&self) -> Option<&ScaleCalibration> {
        self.calibration.as_ref()
    }

    /// Established scale, if calibration has been confirmed
    pub fn pixels_per_meter(&self) -> Option<f64> {
        self.calibration.map(|c| c.pixels_per_meter())
    }

    pub fn result(&self) -> Option<&AreaMeasurement> {
        self.result.as_ref()
    }

    pub fn area_square_meters(&self) -> Option<f64> {
        self.result.as_ref().map(AreaMeasurement::area_square_meters)
    }

    /// Whether the session is waiting for the calibration length
    pub fn is_awaiting_real_length(&self) -> bool {
        self.awaiting_real_length
    }

    /// Last known pointer position (screen space)
    pub fn cursor(&self) -> Option<ScreenPoint> {
        self.cursor
    }

    /// Last known pointer position mapped into image space
    pub fn cursor_image_point(&self) -> Option<ImagePoint> {
        self.cursor.map(|c| self.view.screen_to_image(c))
    }

    /// Drain pending change notifications
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether a re-render has been requested since the last drain
    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    // --- lifecycle --------------------------------------------------------

    /// Load a new image: resets the view, all points, the scale and the
    /// result, and starts calibration.
    pub fn load_image(&mut self, image: ImageHandle) {
        self.clear_measurement_state();
        self.image = Some(image);
        self.cursor = None;

        debug!(width = image.size.width, height = image.size.height, "image loaded");
        self.events.push(SessionEvent::ImageLoaded { size: image.size });
        self.set_phase(Phase::Calibrate);
    }

    /// Hard reset back to Upload
    pub fn reset(&mut self) {
        self.clear_measurement_state();
        self.image = None;
        self.cursor = None;

        debug!("session reset");
        self.events.push(SessionEvent::Reset);
        self.set_phase(Phase::Upload);
    }

    fn clear_measurement_state(&mut self) {
        self.view.reset();
        self.capture.clear();
        self.calibration = None;
        self.awaiting_real_length = false;
        self.result = None;
    }

    // --- point capture ----------------------------------------------------

    /// Place a point at a screen position in the active phase.
    ///
    /// Ignored while a pan drag is in progress, and for positions that do
    /// not map to a finite image point. Completing the calibration segment
    /// requests the real length exactly once.
    pub fn place_point(&mut self, screen: ScreenPoint) -> CaptureOutcome {
        if self.view.is_panning() {
            return CaptureOutcome::Ignored;
        }

        let point = self.view.screen_to_image(screen);
        if !point.is_finite() {
            warn!(x = point.x, y = point.y, "non-finite point ignored");
            return CaptureOutcome::Ignored;
        }
        let outcome = self.capture.add_point(self.phase, point);

        match outcome {
            CaptureOutcome::Ignored => {}
            CaptureOutcome::Added { count } => {
                debug!(
                    phase = ?self.phase,
                    points = count,
                    x = point.x,
                    y = point.y,
                    "point added"
                );
                self.events.push(SessionEvent::PointAdded { phase: self.phase, point });
            }
            CaptureOutcome::CalibrationComplete => {
                self.events.push(SessionEvent::PointAdded { phase: self.phase, point });

                let pixel_length = self.calibration_segment_length().unwrap_or_default();
                self.awaiting_real_length = true;

                debug!(pixel_length, "calibration segment complete");
                self.events.push(SessionEvent::RealLengthRequested { pixel_length });
            }
        }

        outcome
    }

    /// Remove the last point of the active phase's list.
    ///
    /// No-op in Upload and Result, and on an empty list.
    pub fn undo_last(&mut self) -> Option<ImagePoint> {
        let point = self.capture.undo_last(self.phase)?;

        if self.phase == Phase::Calibrate {
            self.awaiting_real_length = false;
        }

        debug!(phase = ?self.phase, "point removed");
        self.events.push(SessionEvent::PointRemoved { phase: self.phase, point });
        Some(point)
    }

    // --- calibration ------------------------------------------------------

    /// Confirm the real length typed by the user.
    ///
    /// On success the scale is stored, any stale polygon is cleared and the
    /// session moves to Measure. On failure the calibration points stay in
    /// place so the user can correct the number.
    pub fn confirm_real_length(&mut self, input: &str) -> MeasureResult<f64> {
        let result = self
            .calibration_candidate_guard()
            .and_then(|_| parse_real_length(input));
        match result {
            Ok(meters) => self.confirm_real_length_meters(meters),
            Err(err) => self.reject(err),
        }
    }

    /// Confirm a real length already parsed by the host
    pub fn confirm_real_length_meters(&mut self, meters: f64) -> MeasureResult<f64> {
        let calibration = self
            .calibration_candidate_guard()
            .and_then(|(p0, p1)| ScaleCalibration::new(p0, p1, meters));
        let calibration = match calibration {
            Ok(calibration) => calibration,
            Err(err) => return self.reject(err),
        };

        let pixels_per_meter = calibration.pixels_per_meter();
        self.calibration = Some(calibration);
        self.awaiting_real_length = false;
        self.capture.reset(Phase::Measure);
        self.result = None;

        info!(pixels_per_meter, real_length_m = meters, "calibrated");
        self.events.push(SessionEvent::Calibrated { pixels_per_meter });
        self.set_phase(Phase::Measure);
        Ok(pixels_per_meter)
    }

    /// The user dismissed the length prompt: drop the segment and stay in
    /// Calibrate so it can be placed again.
    pub fn cancel_real_length(&mut self) -> MeasureResult<()> {
        if self.phase != Phase::Calibrate {
            return self.reject(self.wrong_phase(Phase::Calibrate));
        }

        self.capture.reset(Phase::Calibrate);
        self.awaiting_real_length = false;

        debug!("calibration cancelled");
        self.events.push(SessionEvent::CalibrationCancelled);
        Ok(())
    }

    /// Ask `prompt` for the real length of the pending segment and apply
    /// the answer.
    ///
    /// Returns the new scale, or `None` when the user cancelled.
    pub fn collect_real_length(
        &mut self,
        prompt: &mut dyn RealLengthPrompt,
    ) -> MeasureResult<Option<f64>> {
        let (p0, p1) = match self.calibration_candidate_guard() {
            Ok(segment) => segment,
            Err(err) => return self.reject(err),
        };

        match prompt.request_real_length(p0.distance_to(&p1)) {
            LengthReply::Entered(text) => self.confirm_real_length(&text).map(Some),
            LengthReply::Cancelled => self.cancel_real_length().map(|_| None),
        }
    }

    /// Start calibration over: clears the segment and the stored scale.
    ///
    /// The polygon is kept until the new calibration is confirmed.
    pub fn redo_calibration(&mut self) -> MeasureResult<()> {
        if self.phase == Phase::Upload {
            return self.reject(self.wrong_phase(Phase::Calibrate));
        }

        self.clear_points(Phase::Calibrate);
        self.calibration = None;
        self.awaiting_real_length = false;
        self.result = None;

        debug!("calibration restarted");
        self.set_phase(Phase::Calibrate);
        Ok(())
    }

    fn calibration_candidate_guard(&self) -> MeasureResult<(ImagePoint, ImagePoint)> {
        if self.phase != Phase::Calibrate {
            return Err(self.wrong_phase(Phase::Calibrate));
        }
        self.capture
            .calibration_segment()
            .ok_or(MeasureError::CalibrationIncomplete {
                actual: self.capture.calibration_points().len(),
            })
    }

    // --- measurement ------------------------------------------------------

    /// Switch to the Measure tab with a fresh polygon.
    ///
    /// Rejected with [`MeasureError::ScaleNotSet`] until calibrated.
    pub fn switch_to_measure(&mut self) -> MeasureResult<()> {
        if self.phase == Phase::Upload {
            return self.reject(self.wrong_phase(Phase::Measure));
        }
        if usable_scale(self.pixels_per_meter()).is_none() {
            return self.reject(MeasureError::ScaleNotSet);
        }

        self.clear_points(Phase::Measure);
        self.result = None;
        self.set_phase(Phase::Measure);
        Ok(())
    }

    /// Close the polygon and compute its real-world area.
    pub fn compute_area(&mut self) -> MeasureResult<f64> {
        if self.phase != Phase::Measure {
            return self.reject(self.wrong_phase(Phase::Measure));
        }

        let points = self.capture.measurement_points();
        let measurement = match AreaMeasurement::compute(points, self.pixels_per_meter()) {
            Ok(measurement) => measurement,
            Err(err) => return self.reject(err),
        };

        let area = measurement.area_square_meters();
        info!(
            area_m2 = area,
            area_px = measurement.area_pixels(),
            points = measurement.vertices().len(),
            "area computed"
        );
        self.events.push(SessionEvent::AreaComputed {
            id: measurement.id(),
            area_square_meters: area,
        });
        self.result = Some(measurement);
        self.set_phase(Phase::Result);
        Ok(area)
    }

    /// Discard the result and trace another polygon with the same scale
    pub fn measure_again(&mut self) -> MeasureResult<()> {
        if self.phase != Phase::Result {
            return self.reject(self.wrong_phase(Phase::Result));
        }

        self.capture.reset(Phase::Measure);
        self.result = None;
        self.set_phase(Phase::Measure);
        Ok(())
    }

    // --- view -------------------------------------------------------------

    /// Update the rendering surface's top-left in screen coordinates
    pub fn set_surface_origin(&mut self, origin: ScreenPoint) {
        self.view.set_origin(origin);
    }

    /// Wheel zoom around the cursor
    pub fn zoom(&mut self, cursor: ScreenPoint, direction: ZoomDirection) -> ViewState {
        let state = self.view.zoom(cursor, direction);
        self.events.push(SessionEvent::ViewChanged(state));
        state
    }

    /// Toolbar zoom in around `anchor`
    pub fn zoom_in_step(&mut self, anchor: ScreenPoint) -> ViewState {
        let state = self.view.zoom_in_step(anchor);
        self.events.push(SessionEvent::ViewChanged(state));
        state
    }

    /// Toolbar zoom out around `anchor`
    pub fn zoom_out_step(&mut self, anchor: ScreenPoint) -> ViewState {
        let state = self.view.zoom_out_step(anchor);
        self.events.push(SessionEvent::ViewChanged(state));
        state
    }

    /// Start dragging the view
    pub fn begin_pan(&mut self, screen: ScreenPoint) {
        self.cursor = Some(screen);
        self.view.begin_pan(screen);
    }

    /// Track the pointer; drags the view while a pan is in progress
    pub fn pointer_moved(&mut self, screen: ScreenPoint) {
        self.cursor = Some(screen);
        match self.view.pan(screen) {
            Some(state) => self.events.push(SessionEvent::ViewChanged(state)),
            None => self.events.push(SessionEvent::CursorMoved),
        }
    }

    /// Stop dragging the view
    pub fn end_pan(&mut self) {
        self.view.end_pan();
    }

    pub fn is_panning(&self) -> bool {
        self.view.is_panning()
    }

    // --- helpers ----------------------------------------------------------

    fn clear_points(&mut self, phase: Phase) {
        let had_points = match phase {
            Phase::Calibrate => !self.capture.calibration_points().is_empty(),
            Phase::Measure => !self.capture.measurement_points().is_empty(),
            Phase::Upload | Phase::Result => false,
        };
        self.capture.reset(phase);
        if had_points {
            self.events.push(SessionEvent::PointsCleared { phase });
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        info!(?from, ?to, "phase changed");
        self.events.push(SessionEvent::PhaseChanged { from, to });
    }

    fn wrong_phase(&self, expected: Phase) -> MeasureError {
        MeasureError::WrongPhase {
            expected,
            actual: self.phase,
        }
    }

    fn reject<T>(&self, err: MeasureError) -> MeasureResult<T> {
        warn!(phase = ?self.phase, error = %err, "action rejected");
        Err(err)
    }
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(MeasureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: f64, y: f64) -> ScreenPoint {
        ScreenPoint::new(x, y)
    }

    fn loaded() -> MeasurementSession {
        let mut session = MeasurementSession::default();
        session.load_image(ImageHandle::new(1, 800, 600));
        session.take_events();
        session
    }

    fn calibrated() -> MeasurementSession {
        let mut session = loaded();
        session.place_point(s(10.0, 10.0));
        session.place_point(s(110.0, 10.0));
        session.confirm_real_length("10").unwrap();
        session.take_events();
        session
    }

    #[test]
    fn test_new_session_is_in_upload() {
        let session = MeasurementSession::default();
        assert_eq!(session.phase(), Phase::Upload);
        assert!(session.image().is_none());
        assert!(session.pixels_per_meter().is_none());
        assert!(!session.has_pending_events());
    }

    #[test]
    fn test_load_image_enters_calibrate() {
        let mut session = MeasurementSession::default();
        session.load_image(ImageHandle::new(7, 1024, 768));

        assert_eq!(session.phase(), Phase::Calibrate);
        assert_eq!(session.image().map(|i| i.size), Some(ImageSize::new(1024, 768)));

        let events = session.take_events();
        assert_eq!(
            events,
            vec![
                SessionEvent::ImageLoaded { size: ImageSize::new(1024, 768) },
                SessionEvent::PhaseChanged { from: Phase::Upload, to: Phase::Calibrate },
            ]
        );
        assert!(!session.has_pending_events());
    }

    #[test]
    fn test_load_image_clears_previous_work() {
        let mut session = calibrated();
        session.zoom(s(50.0, 50.0), ZoomDirection::In);
        session.place_point(s(0.0, 0.0));

        session.load_image(ImageHandle::new(2, 640, 480));
        assert_eq!(session.phase(), Phase::Calibrate);
        assert_eq!(session.view_state(), ViewState::default());
        assert!(session.calibration_points().is_empty());
        assert!(session.measurement_points().is_empty());
        assert!(session.pixels_per_meter().is_none());
        assert!(session.result().is_none());
    }

    #[test]
    fn test_real_length_requested_once() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(30.0, 40.0));
        session.place_point(s(99.0, 99.0));

        let requests: Vec<_> = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::RealLengthRequested { .. }))
            .collect();
        assert_eq!(requests, vec![SessionEvent::RealLengthRequested { pixel_length: 50.0 }]);
        assert!(session.is_awaiting_real_length());
        assert_eq!(session.calibration_points().len(), 2);
    }

    #[test]
    fn test_confirm_sets_scale_and_enters_measure() {
        let session = calibrated();
        assert_eq!(session.phase(), Phase::Measure);
        assert_eq!(session.pixels_per_meter(), Some(10.0));
        assert!(!session.is_awaiting_real_length());
        assert!(session.measurement_points().is_empty());
    }

    #[test]
    fn test_invalid_length_keeps_points() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(100.0, 0.0));
        session.take_events();

        for bad in ["-5", "abc", "", "0"] {
            let err = session.confirm_real_length(bad).unwrap_err();
            assert_eq!(err, MeasureError::InvalidInput { input: bad.to_string() });
        }

        assert_eq!(session.phase(), Phase::Calibrate);
        assert_eq!(session.calibration_points().len(), 2);
        assert!(session.is_awaiting_real_length());
        assert!(session.pixels_per_meter().is_none());
        assert!(!session.has_pending_events());
    }

    #[test]
    fn test_degenerate_segment_is_rejected() {
        let mut session = loaded();
        session.place_point(s(5.0, 5.0));
        session.place_point(s(5.0, 5.0));

        assert_eq!(session.confirm_real_length("3"), Err(MeasureError::DegenerateSegment));
        assert_eq!(session.phase(), Phase::Calibrate);
        assert!(session.pixels_per_meter().is_none());
    }

    #[test]
    fn test_confirm_before_segment_complete() {
        let mut session = loaded();
        session.place_point(s(5.0, 5.0));
        assert_eq!(
            session.confirm_real_length("3"),
            Err(MeasureError::CalibrationIncomplete { actual: 1 })
        );
    }

    #[test]
    fn test_cancel_clears_segment_and_stays() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(10.0, 0.0));

        session.cancel_real_length().unwrap();
        assert_eq!(session.phase(), Phase::Calibrate);
        assert!(session.calibration_points().is_empty());
        assert!(!session.is_awaiting_real_length());
    }

    #[test]
    fn test_collect_real_length_with_prompt() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(0.0, 250.0));

        let mut asked = None;
        let mut prompt = |pixel_length: f64| {
            asked = Some(pixel_length);
            LengthReply::Entered("2.5".to_string())
        };
        let scale = session.collect_real_length(&mut prompt).unwrap();

        assert_eq!(asked, Some(250.0));
        assert_eq!(scale, Some(100.0));
        assert_eq!(session.phase(), Phase::Measure);
    }

    #[test]
    fn test_collect_real_length_cancelled() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(0.0, 250.0));

        let mut prompt = |_: f64| LengthReply::Cancelled;
        assert_eq!(session.collect_real_length(&mut prompt), Ok(None));
        assert!(session.calibration_points().is_empty());
    }

    #[test]
    fn test_switch_to_measure_requires_scale() {
        let mut session = loaded();
        assert_eq!(session.switch_to_measure(), Err(MeasureError::ScaleNotSet));
        assert_eq!(session.phase(), Phase::Calibrate);
    }

    #[test]
    fn test_switch_to_measure_clears_polygon() {
        let mut session = calibrated();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(1.0, 0.0));

        session.switch_to_measure().unwrap();
        assert_eq!(session.phase(), Phase::Measure);
        assert!(session.measurement_points().is_empty());
        assert_eq!(session.pixels_per_meter(), Some(10.0));
    }

    #[test]
    fn test_compute_area_needs_three_points() {
        let mut session = calibrated();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(100.0, 0.0));
        session.take_events();

        assert_eq!(
            session.compute_area(),
            Err(MeasureError::InsufficientVertices { required: 3, actual: 2 })
        );
        assert_eq!(session.phase(), Phase::Measure);
        assert_eq!(session.measurement_points().len(), 2);
        assert!(session.result().is_none());
        assert!(!session.has_pending_events());
    }

    #[test]
    fn test_compute_area_and_measure_again() {
        let mut session = calibrated();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)] {
            session.place_point(s(x, y));
        }

        assert_eq!(session.compute_area(), Ok(100.0));
        assert_eq!(session.phase(), Phase::Result);
        assert_eq!(session.area_square_meters(), Some(100.0));

        // Clicks and undo do nothing while the result is shown
        assert_eq!(session.place_point(s(5.0, 5.0)), CaptureOutcome::Ignored);
        assert_eq!(session.undo_last(), None);
        assert_eq!(session.measurement_points().len(), 4);

        session.measure_again().unwrap();
        assert_eq!(session.phase(), Phase::Measure);
        assert!(session.measurement_points().is_empty());
        assert!(session.result().is_none());
        assert_eq!(session.pixels_per_meter(), Some(10.0));
    }

    #[test]
    fn test_compute_area_outside_measure() {
        let mut session = loaded();
        assert_eq!(
            session.compute_area(),
            Err(MeasureError::WrongPhase { expected: Phase::Measure, actual: Phase::Calibrate })
        );
    }

    #[test]
    fn test_measure_again_outside_result() {
        let mut session = calibrated();
        assert!(matches!(session.measure_again(), Err(MeasureError::WrongPhase { .. })));
    }

    #[test]
    fn test_undo_routes_to_active_phase() {
        let mut session = loaded();
        session.place_point(s(0.0, 0.0));
        session.place_point(s(10.0, 0.0));
        assert!(session.is_awaiting_real_length());

        assert_eq!(session.undo_last(), Some(ImagePoint::new(10.0, 0.0)));
        assert!(!session.is_awaiting_real_length());
        assert_eq!(session.calibration_points().len(), 1);

        assert_eq!(session.undo_last(), Some(ImagePoint::new(0.0, 0.0)));
        assert_eq!(session.undo_last(), None);
    }

    #[test]
    fn test_redo_calibration_clears_scale_but_keeps_polygon() {
        let mut session = calibrated();
        session.place_point(s(0.0, 0.0));

        session.redo_calibration().unwrap();
        assert_eq!(session.phase(), Phase::Calibrate);
        assert!(session.calibration_points().is_empty());
        assert!(session.pixels_per_meter().is_none());
        assert_eq!(session.measurement_points().len(), 1);

        // Confirming the new calibration starts a fresh polygon
        session.place_point(s(0.0, 0.0));
        session.place_point(s(0.0, 20.0));
        session.confirm_real_length("4").unwrap();
        assert_eq!(session.pixels_per_meter(), Some(5.0));
        assert!(session.measurement_points().is_empty());
    }

    #[test]
    fn test_reset_returns_to_upload() {
        let mut session = calibrated();
        session.reset();

        assert_eq!(session.phase(), Phase::Upload);
        assert!(session.image().is_none());
        assert!(session.pixels_per_meter().is_none());
        assert_eq!(session.place_point(s(1.0, 1.0)), CaptureOutcome::Ignored);
        assert_eq!(
            session.redo_calibration(),
            Err(MeasureError::WrongPhase {
                expected: Phase::Calibrate,
                actual: Phase::Upload,
            })
        );
    }

    #[test]
    fn test_points_use_view_transform() {
        let mut session = loaded();
        session.set_surface_origin(s(100.0, 50.0));
        session.zoom_in_step(s(100.0, 50.0)); // anchored at origin, offset stays 0

        session.place_point(s(220.0, 50.0));
        let p = session.calibration_points()[0];
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_no_points_while_panning() {
        let mut session = loaded();
        session.begin_pan(s(10.0, 10.0));
        session.pointer_moved(s(40.0, 30.0));
        assert_eq!(session.place_point(s(40.0, 30.0)), CaptureOutcome::Ignored);
        assert_eq!(session.view_state().offset_x, 30.0);
        assert_eq!(session.view_state().offset_y, 20.0);

        session.end_pan();
        assert!(matches!(session.place_point(s(40.0, 30.0)), CaptureOutcome::Added { count: 1 }));
        assert_eq!(session.calibration_points()[0], ImagePoint::new(10.0, 10.0));
    }

    #[test]
    fn test_cursor_tracking() {
        let mut session = loaded();
        session.pointer_moved(s(12.0, 34.0));
        assert_eq!(session.cursor(), Some(s(12.0, 34.0)));
        assert_eq!(session.cursor_image_point(), Some(ImagePoint::new(12.0, 34.0)));
        assert_eq!(session.take_events(), vec![SessionEvent::CursorMoved]);
    }

    #[test]
    fn test_scale_overflow_keeps_calibration_open() {
        let mut session = loaded();
        session.place_point(s(10.0, 10.0));
        session.place_point(s(110.0, 10.0));
        session.take_events();

        assert!(matches!(
            session.confirm_real_length("1e-320"),
            Err(MeasureError::InvalidInput { .. })
        ));
        assert_eq!(session.phase(), Phase::Calibrate);
        assert_eq!(session.pixels_per_meter(), None);
        assert_eq!(session.calibration_points().len(), 2);
        assert!(session.is_awaiting_real_length());
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_non_finite_point_is_ignored() {
        let mut session = calibrated();
        session.take_events();

        for screen in [s(f64::NAN, 0.0), s(0.0, f64::INFINITY), s(f64::NEG_INFINITY, 1.0)] {
            assert_eq!(session.place_point(screen), CaptureOutcome::Ignored);
        }
        assert!(session.measurement_points().is_empty());
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_area_overflow_is_rejected() {
        let mut session = calibrated();
        for (x, y) in [(0.0, 0.0), (1e200, 0.0), (1e200, 1e200)] {
            session.place_point(s(x, y));
        }
        session.take_events();

        assert_eq!(session.compute_area(), Err(MeasureError::NonFiniteArea));
        assert_eq!(session.phase(), Phase::Measure);
        assert_eq!(session.result(), None);
        assert_eq!(session.measurement_points().len(), 3);
        assert!(session.take_events().is_empty());
    }

    #[test]
    fn test_switch_to_measure_within_measure_keeps_phase_quiet() {
        let mut session = calibrated();
        session.take_events();

        session.switch_to_measure().unwrap();
        assert!(session.take_events().is_empty());

        session.place_point(s(5.0, 5.0));
        session.take_events();
        session.switch_to_measure().unwrap();
        assert_eq!(
            session.take_events(),
            vec![SessionEvent::PointsCleared { phase: Phase::Measure }]
        );
        assert!(session.measurement_points().is_empty());
        assert_eq!(session.phase(), Phase::Measure);
    }

    #[test]
    fn test_load_image_clears_cursor() {
        let mut session = loaded();
        session.pointer_moved(s(12.0, 34.0));
        session.load_image(ImageHandle::new(2, 640, 480));
        assert_eq!(session.cursor(), None);
        assert_eq!(session.cursor_image_point(), None);
    }
}
