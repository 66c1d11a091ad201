//! Capture → quality check → submit lifecycle
//!
//! [`CaptureController`] is the single owner of the session: current
//! [`SessionState`], the captured [`Frame`], its [`QualityScore`] and the
//! latest [`VerificationResult`]. Events that are invalid for the current
//! state are ignored, so a frame can only be submitted from
//! `PreviewSharp`.
//!
//! Submission is split into [`CaptureController::begin_submission`] and
//! [`CaptureController::finish_submission`] so a host can run the request
//! elsewhere. Each submission carries the session generation; an outcome
//! whose generation no longer matches is dropped.

pub mod state;

pub use state::{Event, SessionState};

use crate::camera::{CameraSource, ScopedCamera};
use crate::config::VerifierConfig;
use crate::errors::SubmissionError;
use crate::quality::{QualityEvaluator, VisionEngine};
use crate::submission::Submitter;
use crate::types::{CameraConstraints, FacingMode, Frame, QualityScore, Verdict, VerificationResult};
use serde::Serialize;
use std::sync::Arc;

/// Frame handed over to the submission client.
#[derive(Debug)]
pub struct SubmissionTicket {
    generation: u64,
    frame: Frame,
}

impl SubmissionTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub mime_type: String,
    pub size_bytes: usize,
    pub width: u32,
    pub height: u32,
}

/// Everything a renderer needs, detached from the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub state: SessionState,
    pub facing_mode: FacingMode,
    pub frame: Option<FrameSummary>,
    pub score: Option<QualityScore>,
    pub result: Option<VerificationResult>,
    pub error: Option<String>,
}

pub struct CaptureController<C: CameraSource, S: Submitter> {
    state: SessionState,
    camera: ScopedCamera<C>,
    constraints: CameraConstraints,
    evaluator: Option<QualityEvaluator>,
    submitter: Arc<S>,
    frame: Option<Frame>,
    score: Option<QualityScore>,
    result: Option<VerificationResult>,
    error: Option<String>,
    generation: u64,
}

impl<C: CameraSource, S: Submitter> CaptureController<C, S> {
    /// `evaluator: None` skips the blur check; every capture is then sharp.
    pub fn new(
        camera: C,
        evaluator: Option<QualityEvaluator>,
        submitter: Arc<S>,
        constraints: CameraConstraints,
    ) -> Self {
        Self {
            state: SessionState::Idle,
            camera: ScopedCamera::new(camera),
            constraints,
            evaluator,
            submitter,
            frame: None,
            score: None,
            result: None,
            error: None,
            generation: 0,
        }
    }

    pub fn from_config(
        camera: C,
        engine: Arc<VisionEngine>,
        submitter: Arc<S>,
        config: &VerifierConfig,
    ) -> Self {
        let evaluator = config
            .quality
            .enabled
            .then(|| QualityEvaluator::new(engine, &config.quality));
        Self::new(camera, evaluator, submitter, config.camera.constraints())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn score(&self) -> Option<&QualityScore> {
        self.score.as_ref()
    }

    pub fn result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.constraints.facing_mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn camera(&self) -> &ScopedCamera<C> {
        &self.camera
    }

    pub fn submitter(&self) -> Arc<S> {
        self.submitter.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            facing_mode: self.constraints.facing_mode,
            frame: self.frame.as_ref().map(|f| FrameSummary {
                mime_type: f.mime_type.clone(),
                size_bytes: f.size_bytes(),
                width: f.width,
                height: f.height,
            }),
            score: self.score,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }

    /// Dispatch one user event. Returns the resulting state.
    pub async fn handle(&mut self, event: Event) -> SessionState {
        match event {
            Event::Start => self.start(),
            Event::CaptureFrame => self.capture_frame().await,
            Event::Retake => self.retake(),
            Event::ConfirmSubmit => self.confirm_submit().await,
            Event::StartOver => self.start_over(),
            Event::ToggleFacingMode => self.toggle_facing_mode(),
        }
    }

    fn ignore(&self, event: Event) -> bool {
        if self.state.accepts(event) {
            return false;
        }
        log::warn!("Ignoring {:?} in state {}", event, self.state);
        true
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            log::info!("Session {} -> {}", self.state, next);
        }
        self.state = next;
        if !next.holds_camera() {
            self.camera.release();
        }
    }

    /// Acquire the camera and enter `Capturing`, or fall back to `Idle`
    /// with the camera error as a blocking message.
    fn enter_capturing(&mut self) -> SessionState {
        match self.camera.acquire(self.constraints) {
            Ok(()) => {
                self.error = None;
                self.transition(SessionState::Capturing);
            }
            Err(e) => {
                log::error!("Camera unavailable: {}", e);
                self.error = Some(e.to_string());
                self.transition(SessionState::Idle);
            }
        }
        self.state
    }

    fn clear_capture(&mut self) {
        self.frame = None;
        self.score = None;
        self.result = None;
        self.error = None;
    }

    pub fn start(&mut self) -> SessionState {
        if self.ignore(Event::Start) {
            return self.state;
        }
        self.clear_capture();
        self.enter_capturing()
    }

    pub fn toggle_facing_mode(&mut self) -> SessionState {
        if self.ignore(Event::ToggleFacingMode) {
            return self.state;
        }
        self.constraints = self
            .constraints
            .with_facing_mode(self.constraints.facing_mode.toggled());
        log::info!("Switching camera to {}", self.constraints.facing_mode.label());
        self.enter_capturing()
    }

    /// Grab one still and score it.
    pub async fn capture_frame(&mut self) -> SessionState {
        if self.ignore(Event::CaptureFrame) {
            return self.state;
        }

        let frame = match self.camera.capture() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Capture failed: {}", e);
                self.error = Some(e.to_string());
                return self.state;
            }
        };

        let evaluation = match &self.evaluator {
            Some(evaluator) => Some(evaluator.evaluate(&frame).await),
            None => None,
        };

        let score = match evaluation {
            None => {
                self.frame = Some(frame);
                self.score = None;
                self.error = None;
                self.transition(SessionState::PreviewSharp);
                return self.state;
            }
            Some(Ok(score)) => score,
            Some(Err(e)) => {
                log::warn!("Quality check failed: {}", e);
                self.error = Some(format!("Could not check image quality: {}", e));
                return self.state;
            }
        };

        self.frame = Some(frame);
        self.score = Some(score);
        if score.is_blurry {
            self.error = Some(format!(
                "Image is too blurry (sharpness {:.1} < {:.1}); please retake the photo",
                score.variance, score.threshold
            ));
            self.transition(SessionState::PreviewBlurry);
        } else {
            self.error = None;
            self.transition(SessionState::PreviewSharp);
        }
        self.state
    }

    /// Discard the current capture and reopen the camera.
    pub fn retake(&mut self) -> SessionState {
        if self.ignore(Event::Retake) {
            return self.state;
        }
        self.clear_capture();
        self.enter_capturing()
    }

    /// Enter `Submitting` and hand the frame out. `None` unless in `PreviewSharp`.
    pub fn begin_submission(&mut self) -> Option<SubmissionTicket> {
        if self.ignore(Event::ConfirmSubmit) {
            return None;
        }
        let frame = self.frame.take()?;
        self.generation += 1;
        self.result = None;
        self.error = None;
        self.transition(SessionState::Submitting);
        Some(SubmissionTicket {
            generation: self.generation,
            frame,
        })
    }

    /// Apply a submission outcome. Returns `false` when it was stale.
    pub fn finish_submission(
        &mut self,
        generation: u64,
        outcome: Result<VerificationResult, SubmissionError>,
    ) -> bool {
        if self.state != SessionState::Submitting || generation != self.generation {
            log::warn!(
                "Discarding stale submission outcome (generation {}, current {} in {})",
                generation,
                self.generation,
                self.state
            );
            return false;
        }

        self.score = None;
        match outcome {
            Ok(result) => {
                let next = match result.verdict {
                    Verdict::Pass => SessionState::Pass,
                    Verdict::Fail => SessionState::Fail,
                };
                self.result = Some(result);
                self.error = None;
                self.transition(next);
            }
            Err(e) => {
                self.result = None;
                self.error = Some(e.to_string());
                self.transition(SessionState::Fail);
            }
        }
        true
    }

    /// Submit the previewed frame once and wait for the outcome.
    pub async fn confirm_submit(&mut self) -> SessionState {
        let Some(ticket) = self.begin_submission() else {
            return self.state;
        };
        let outcome = self.submitter.submit(&ticket.frame).await;
        self.finish_submission(ticket.generation, outcome);
        self.state
    }

    pub fn start_over(&mut self) -> SessionState {
        if self.ignore(Event::StartOver) {
            return self.state;
        }
        self.clear_capture();
        self.generation += 1;
        self.transition(SessionState::Idle);
        self.state
    }

    /// The host is going away: release the camera and invalidate any
    /// submission still in flight.
    pub fn shutdown(&mut self) {
        self.generation += 1;
        self.camera.release();
    }

    /// Start, capture one frame and submit it if sharp, stopping at the
    /// first state that needs a user decision. The camera is released
    /// before returning whatever state the session stopped in.
    pub async fn run_once(&mut self) -> Snapshot {
        if self.start() == SessionState::Capturing
            && self.capture_frame().await == SessionState::PreviewSharp
        {
            self.confirm_submit().await;
        }
        self.shutdown();
        self.snapshot()
    }
}
