//! Camera source that serves pre-encoded stills
//!
//! Used by the CLI to feed an image file through the capture flow and by
//! tests to script exactly what the "camera" returns.

use super::CameraSource;
use crate::errors::CameraError;
use crate::types::{CameraConstraints, Frame};
use image::ImageReader;
use std::collections::VecDeque;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Open/close bookkeeping shared with whoever created the source.
#[derive(Debug, Default)]
pub struct SourceStats {
    opens: AtomicUsize,
    closes: AtomicUsize,
    captures: AtomicUsize,
    constraints: Mutex<Vec<CameraConstraints>>,
}

impl SourceStats {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    /// Whether the device is currently held.
    pub fn is_open(&self) -> bool {
        self.opens() > self.closes()
    }

    /// Constraints of every successful open, oldest first.
    pub fn requested_constraints(&self) -> Vec<CameraConstraints> {
        self.constraints
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

pub struct StillImageSource {
    queue: VecDeque<Frame>,
    last: Option<Frame>,
    open: bool,
    denied: Option<String>,
    stats: Arc<SourceStats>,
}

impl StillImageSource {
    /// Frames are served in order; the last one repeats once the queue drains.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            queue: frames.into(),
            last: None,
            open: false,
            denied: None,
            stats: Arc::new(SourceStats::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            CameraError::Unavailable(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mime_type = image::guess_format(&data)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");

        // Header-only read; undecodable files still load and fail the quality check.
        let (width, height) = ImageReader::new(Cursor::new(&data))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok())
            .unwrap_or((0, 0));

        let frame = Frame::new(data, mime_type)
            .with_dimensions(width, height)
            .with_device(path.display().to_string());
        log::debug!("Loaded still {} ({} bytes, {})", path.display(), frame.size_bytes(), mime_type);
        Ok(Self::from_frames(vec![frame]))
    }

    /// A source whose device can never be opened.
    pub fn denied(message: impl Into<String>) -> Self {
        let mut source = Self::from_frames(Vec::new());
        source.denied = Some(message.into());
        source
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.queue.push_back(frame);
    }

    pub fn stats(&self) -> Arc<SourceStats> {
        self.stats.clone()
    }
}

impl CameraSource for StillImageSource {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError> {
        if let Some(message) = &self.denied {
            return Err(CameraError::PermissionDenied(message.clone()));
        }
        if self.open {
            return Err(CameraError::Unavailable("device is already open".to_string()));
        }
        self.open = true;
        self.stats.opens.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut g) = self.stats.constraints.lock() {
            g.push(*constraints);
        }
        Ok(())
    }

    fn capture_still(&mut self) -> Result<Frame, CameraError> {
        if !self.open {
            return Err(CameraError::NotStreaming);
        }
        if let Some(frame) = self.queue.pop_front() {
            self.last = Some(frame);
        }
        let frame = self
            .last
            .clone()
            .ok_or_else(|| CameraError::CaptureError("no still image available".to_string()))?;
        self.stats.captures.fetch_add(1, Ordering::SeqCst);
        Ok(frame)
    }

    fn close(&mut self) -> Result<(), CameraError> {
        if !self.open {
            return Err(CameraError::NotStreaming);
        }
        self.open = false;
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MIME_PNG;

    #[test]
    fn test_frames_served_in_order_then_last_repeats() {
        let mut source = StillImageSource::from_frames(vec![
            Frame::jpeg(vec![1]),
            Frame::jpeg(vec![2]),
        ]);
        source.open(&CameraConstraints::default()).unwrap();
        assert_eq!(source.capture_still().unwrap().data.as_ref(), &[1]);
        assert_eq!(source.capture_still().unwrap().data.as_ref(), &[2]);
        assert_eq!(source.capture_still().unwrap().data.as_ref(), &[2]);
        assert_eq!(source.stats().captures(), 3);
    }

    #[test]
    fn test_empty_source_reports_capture_error() {
        let mut source = StillImageSource::from_frames(Vec::new());
        source.open(&CameraConstraints::default()).unwrap();
        assert!(matches!(source.capture_still(), Err(CameraError::CaptureError(_))));
    }

    #[test]
    fn test_double_open_is_rejected() {
        let mut source = StillImageSource::from_frames(Vec::new());
        source.open(&CameraConstraints::default()).unwrap();
        assert!(matches!(
            source.open(&CameraConstraints::default()),
            Err(CameraError::Unavailable(_))
        ));
    }

    #[test]
    fn test_from_file_detects_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        image::RgbImage::from_pixel(4, 4, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let mut source = StillImageSource::from_file(&path).unwrap();
        source.open(&CameraConstraints::default()).unwrap();
        assert_eq!(source.capture_still().unwrap().mime_type, MIME_PNG);
    }

    #[test]
    fn test_from_file_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.png");
        image::RgbImage::from_pixel(48, 30, image::Rgb([200, 200, 200]))
            .save(&path)
            .unwrap();

        let mut source = StillImageSource::from_file(&path).unwrap();
        source.open(&CameraConstraints::default()).unwrap();
        let frame = source.capture_still().unwrap();
        assert_eq!((frame.width, frame.height), (48, 30));
    }

    #[test]
    fn test_from_file_keeps_undecodable_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let mut source = StillImageSource::from_file(&path).unwrap();
        source.open(&CameraConstraints::default()).unwrap();
        let frame = source.capture_still().unwrap();
        assert_eq!((frame.width, frame.height), (0, 0));
        assert_eq!(frame.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_from_missing_file() {
        let result = StillImageSource::from_file("/nonexistent/card.jpg");
        assert!(matches!(result, Err(CameraError::Unavailable(_))));
    }
}
