//! idcapture: camera capture, blur check and ID-document verification
//!
//! This crate drives the lifecycle of photographing an identity document
//! and sending it for OCR-based verification:
//!
//! Idle → Capturing → PreviewBlurry | PreviewSharp → Submitting → Pass | Fail
//!
//! # Features
//! - Pluggable camera sources with scoped device acquisition
//! - Client-side blur check (Laplacian variance or pixel-difference)
//! - Multipart submission to an OCR endpoint, one attempt per confirm
//! - Single-task event loop with a watch channel of UI snapshots
//! - Optional native camera backend (`native` feature, via nokhwa)
//!
//! # Usage
//! ```rust,ignore
//! use idcapture::{CaptureController, HttpSubmitter, VerifierConfig, VisionEngine};
//! use idcapture::camera::StillImageSource;
//! use std::sync::Arc;
//!
//! let config = VerifierConfig::load_or_default();
//! let engine = Arc::new(VisionEngine::new());
//! engine.load().await;
//! let submitter = Arc::new(HttpSubmitter::new(&config.submission)?);
//! let camera = StillImageSource::from_file("card.jpg")?;
//! let mut session = CaptureController::from_config(camera, engine, submitter, &config);
//! session.start();
//! session.capture_frame().await;
//! session.confirm_submit().await;
//! ```
pub mod camera;
pub mod config;
pub mod controller;
pub mod driver;
pub mod errors;
pub mod quality;
pub mod submission;
pub mod types;

// Testing utilities - synthetic frames and a scripted submitter
pub mod testing;

pub use camera::{CameraSource, ScopedCamera};
pub use config::VerifierConfig;
pub use controller::{CaptureController, Event, SessionState, Snapshot};
pub use driver::SessionDriver;
pub use errors::{CameraError, ConfigError, QualityError, SubmissionError, VerifyError};
pub use quality::{QualityEvaluator, VisionEngine};
pub use submission::{HttpSubmitter, Submitter};
pub use types::{
    BlurAlgorithm, CameraConstraints, FacingMode, Frame, OcrFields, QualityScore, Verdict,
    VerificationResult,
};

/// Initialize logging for the capture session
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "idcapture=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        native_camera: cfg!(feature = "native"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub native_camera: bool,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "idcapture");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }
}
