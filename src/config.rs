//! Configuration management for idcapture
//!
//! Provides configuration loading, saving, and validation for camera
//! constraints, blur-check thresholds and the verification endpoint.

use crate::errors::ConfigError;
use crate::types::{BlurAlgorithm, CameraConstraints, FacingMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Camera stream request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Facing mode opened on `start` ("user" or "environment")
    pub facing_mode: FacingMode,
    /// Ideal stream width in pixels
    pub ideal_width: u32,
    /// Ideal stream height in pixels
    pub ideal_height: u32,
}

/// Client-side blur check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Run the blur check on every captured frame
    pub enabled: bool,
    pub algorithm: BlurAlgorithm,
    /// Frames whose Laplacian variance is below this are blurry
    pub laplacian_threshold: f64,
    /// Frames whose mean squared red-channel difference is below this are blurry
    pub pixel_diff_threshold: f64,
    /// Horizontal sampling stride for the pixel-diff heuristic, in pixels
    pub pixel_diff_stride: u32,
}

/// Verification endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Full URL of the OCR/verification endpoint
    pub endpoint: String,
    /// Multipart field carrying the image
    pub field_name: String,
    /// File name stem sent with the image part
    pub file_stem: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: BlurAlgorithm::Laplacian,
            laplacian_threshold: 100.0,
            pixel_diff_threshold: 100.0,
            pixel_diff_stride: 4,
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/ocr".to_string(),
            field_name: "idCardImage".to_string(),
            file_stem: "id-card".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl CameraConfig {
    pub fn constraints(&self) -> CameraConstraints {
        CameraConstraints::new(self.facing_mode, self.ideal_width, self.ideal_height)
    }
}

impl QualityConfig {
    /// Threshold that applies to the configured algorithm
    pub fn threshold(&self) -> f64 {
        match self.algorithm {
            BlurAlgorithm::Laplacian => self.laplacian_threshold,
            BlurAlgorithm::PixelDiff => self.pixel_diff_threshold,
        }
    }
}

impl SubmissionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl VerifierConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: VerifierConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError(format!("Failed to create config directory: {}", e)))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("idcapture.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            return Err(ConfigError("Invalid ideal resolution".to_string()));
        }

        let thresholds = [self.quality.laplacian_threshold, self.quality.pixel_diff_threshold];
        if thresholds.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(ConfigError(
                "Blur thresholds must be finite and positive".to_string(),
            ));
        }
        if self.quality.pixel_diff_stride == 0 {
            return Err(ConfigError("Pixel-diff stride must be at least 1".to_string()));
        }

        if self.submission.endpoint.trim().is_empty() {
            return Err(ConfigError("Submission endpoint is empty".to_string()));
        }
        if self.submission.field_name.trim().is_empty() {
            return Err(ConfigError("Multipart field name is empty".to_string()));
        }
        if self.submission.timeout_ms == 0 {
            return Err(ConfigError("Submission timeout must be non-zero".to_string()));
        }

        Ok(())
    }
}
