//! Device camera backed by nokhwa
//!
//! Frames are decoded to RGB by nokhwa and re-encoded as JPEG so the rest
//! of the pipeline only ever sees encoded stills.

use super::CameraSource;
use crate::errors::CameraError;
use crate::types::{CameraConstraints, FacingMode, Frame, MIME_JPEG};
use image::codecs::jpeg::JpegEncoder;
use nokhwa::{
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, CameraInfo, RequestedFormat, RequestedFormatType},
    CallbackCamera,
};
use std::sync::{Arc, Mutex};

const JPEG_QUALITY: u8 = 92;

pub struct NativeCamera {
    camera: Option<Arc<Mutex<CallbackCamera>>>,
    device_id: String,
}

impl NativeCamera {
    pub fn new() -> Self {
        Self {
            camera: None,
            device_id: String::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl Default for NativeCamera {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the device whose name matches the facing mode, else the first one.
fn select_device(devices: &[CameraInfo], facing_mode: FacingMode) -> Option<CameraIndex> {
    let hints: &[&str] = match facing_mode {
        FacingMode::User => &["front", "face", "user", "integrated"],
        FacingMode::Environment => &["back", "rear", "environment", "world"],
    };

    devices
        .iter()
        .find(|info| {
            let name = info.human_name().to_lowercase();
            hints.iter().any(|hint| name.contains(hint))
        })
        .or_else(|| devices.first())
        .map(|info| info.index().clone())
}

impl CameraSource for NativeCamera {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        let devices = query(ApiBackend::Auto)
            .map_err(|e| CameraError::Unavailable(format!("Failed to query cameras: {}", e)))?;

        let index = select_device(&devices, constraints.facing_mode)
            .ok_or_else(|| CameraError::Unavailable("No camera devices found".to_string()))?;

        let requested_format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            nokhwa::utils::CameraFormat::new(
                nokhwa::utils::Resolution::new(constraints.ideal_width, constraints.ideal_height),
                nokhwa::utils::FrameFormat::MJPEG,
                30,
            ),
        ));

        let mut camera = CallbackCamera::new(index.clone(), requested_format, |_| {})
            .map_err(|e| classify_open_error(e.to_string()))?;

        camera
            .open_stream()
            .map_err(|e| classify_open_error(e.to_string()))?;

        self.device_id = index.to_string();
        self.camera = Some(Arc::new(Mutex::new(camera)));
        Ok(())
    }

    fn capture_still(&mut self) -> Result<Frame, CameraError> {
        let camera = self.camera.as_ref().ok_or(CameraError::NotStreaming)?;
        let mut camera = camera
            .lock()
            .map_err(|_| CameraError::CaptureError("Failed to lock camera".to_string()))?;

        let buffer = camera
            .poll_frame()
            .map_err(|e| CameraError::CaptureError(format!("Failed to capture frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::CaptureError(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        let rgb = image::RgbImage::from_raw(width, height, decoded.into_raw())
            .ok_or_else(|| CameraError::CaptureError("Frame buffer size mismatch".to_string()))?;

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY)
            .encode_image(&rgb)
            .map_err(|e| CameraError::CaptureError(format!("Failed to encode frame: {}", e)))?;

        Ok(Frame::new(data, MIME_JPEG)
            .with_dimensions(width, height)
            .with_device(self.device_id.clone()))
    }

    fn close(&mut self) -> Result<(), CameraError> {
        let camera = self.camera.take().ok_or(CameraError::NotStreaming)?;
        let mut camera = camera
            .lock()
            .map_err(|_| CameraError::Unavailable("Failed to lock camera".to_string()))?;
        camera
            .stop_stream()
            .map_err(|e| CameraError::Unavailable(format!("Failed to stop stream: {}", e)))
    }
}

fn classify_open_error(message: String) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized") {
        CameraError::PermissionDenied(message)
    } else {
        CameraError::Unavailable(message)
    }
}
