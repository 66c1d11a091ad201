use thiserror::Error;

/// Failures acquiring or reading the camera device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("Permission denied error: {0}")]
    PermissionDenied(String),
    #[error("Camera unavailable: {0}")]
    Unavailable(String),
    #[error("Capture error: {0}")]
    CaptureError(String),
    #[error("Camera is not streaming")]
    NotStreaming,
}

/// Failures while scoring a frame. A blurry frame is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QualityError {
    #[error("image engine is not ready")]
    EngineNotReady,
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("image is too small to evaluate ({width}x{height})")]
    TooSmall { width: u32, height: u32 },
    #[error("quality task failed: {0}")]
    Task(String),
}

/// Failures of a single submission attempt. The message is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Non-success HTTP status.
    #[error("{message}")]
    Http { status: u16, message: String },
    /// `success: false` in an otherwise well-formed response.
    #[error("{0}")]
    Rejected(String),
    /// Body was not the JSON shape the endpoint promises.
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// Umbrella error for callers that drive the whole flow.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Quality(#[from] QualityError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
