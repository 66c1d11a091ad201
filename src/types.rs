use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// One still image captured from a camera source.
///
/// The payload stays encoded; decoding happens only inside the quality
/// evaluator. `Bytes` keeps hand-off to the submission client copy-free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Bytes,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub device_id: String,
}

impl Frame {
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
            width: 0,
            height: 0,
            device_id: String::new(),
        }
    }

    pub fn jpeg(data: impl Into<Bytes>) -> Self {
        Self::new(data, MIME_JPEG)
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// File extension matching the mime type, used for the upload file name.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            MIME_PNG => "png",
            _ => "jpg",
        }
    }
}

/// Which camera to open on devices that have more than one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera.
    User,
    /// Back camera.
    #[default]
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FacingMode::User => "front",
            FacingMode::Environment => "back",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::User => write!(f, "user"),
            FacingMode::Environment => write!(f, "environment"),
        }
    }
}

/// Stream request handed to a camera source when it is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl CameraConstraints {
    pub fn new(facing_mode: FacingMode, ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            facing_mode,
            ideal_width,
            ideal_height,
        }
    }

    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = facing_mode;
        self
    }
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self::new(FacingMode::Environment, 1280, 720)
    }
}

/// Sharpness proxy used to score a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurAlgorithm {
    /// Mean squared horizontal difference of the red channel at a fixed stride.
    PixelDiff,
    /// Variance of the 4-neighbour Laplacian over the luma plane.
    #[default]
    Laplacian,
}

/// Result of one quality evaluation. Recomputed for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub variance: f64,
    pub threshold: f64,
    pub algorithm: BlurAlgorithm,
    pub is_blurry: bool,
}

impl QualityScore {
    pub fn classify(variance: f64, threshold: f64, algorithm: BlurAlgorithm) -> Self {
        Self {
            variance,
            threshold,
            algorithm,
            is_blurry: variance < threshold,
        }
    }
}

/// Fields recognised by the OCR service. Any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_th: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl OcrFields {
    /// Label/value pairs in display order; missing values read "N/A".
    pub fn display_rows(&self) -> [(&'static str, &str); 5] {
        fn show(v: &Option<String>) -> &str {
            match v.as_deref() {
                Some(s) if !s.is_empty() => s,
                _ => "N/A",
            }
        }
        [
            ("ID", show(&self.identification_number)),
            ("TH", show(&self.name_th)),
            ("EN", show(&self.name_en)),
            ("DOB", show(&self.date_of_birth)),
            ("EXP", show(&self.date_of_expiry)),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

/// Outcome of a successful round trip to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub fields: OcrFields,
    pub verdict: Verdict,
}
