//! Scripted submission client.

use crate::errors::SubmissionError;
use crate::submission::Submitter;
use crate::types::{Frame, OcrFields, Verdict, VerificationResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

/// Returns the same outcome for every submission and records what it saw.
pub struct StaticSubmitter {
    outcome: Result<VerificationResult, SubmissionError>,
    calls: AtomicUsize,
    frames: Mutex<Vec<Frame>>,
    gate: Option<Arc<Notify>>,
}

impl StaticSubmitter {
    pub fn new(outcome: Result<VerificationResult, SubmissionError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            frames: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Verdict `pass` with a fully populated card.
    pub fn pass() -> Self {
        Self::new(Ok(VerificationResult {
            fields: sample_fields(),
            verdict: Verdict::Pass,
        }))
    }

    pub fn failing(error: SubmissionError) -> Self {
        Self::new(Err(error))
    }

    /// Hold every submission until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Submitter for StaticSubmitter {
    async fn submit(&self, frame: &Frame) -> Result<VerificationResult, SubmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcome.clone()
    }
}

pub fn sample_fields() -> OcrFields {
    OcrFields {
        identification_number: Some("1101700203451".to_string()),
        name_th: Some("นาย สมชาย ใจดี".to_string()),
        name_en: Some("Mr. Somchai Jaidee".to_string()),
        date_of_birth: Some("12 Jan 1985".to_string()),
        date_of_expiry: Some("11 Jan 2030".to_string()),
        raw_text: None,
    }
}
