//! Camera sources and scoped device acquisition
//!
//! A [`CameraSource`] is anything that can open a video stream with
//! [`CameraConstraints`] and hand back one encoded still on demand.
//! [`ScopedCamera`] wraps a source so the device is released on every
//! exit path: explicit release, re-acquisition and drop.

#[cfg(feature = "native")]
pub mod native;
pub mod still;

#[cfg(feature = "native")]
pub use native::NativeCamera;
pub use still::{SourceStats, StillImageSource};

use crate::errors::CameraError;
use crate::types::{CameraConstraints, Frame};

/// Device camera abstraction.
pub trait CameraSource: Send {
    /// Open the stream. Called only while the source is closed.
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CameraError>;

    /// Grab one still from the open stream as an encoded image.
    fn capture_still(&mut self) -> Result<Frame, CameraError>;

    /// Release the device.
    fn close(&mut self) -> Result<(), CameraError>;
}

/// Owns a camera source and tracks whether its device is held.
pub struct ScopedCamera<C: CameraSource> {
    source: C,
    active: Option<CameraConstraints>,
}

impl<C: CameraSource> ScopedCamera<C> {
    pub fn new(source: C) -> Self {
        Self {
            source,
            active: None,
        }
    }

    /// Open the device, releasing any stream that is already held first.
    pub fn acquire(&mut self, constraints: CameraConstraints) -> Result<(), CameraError> {
        self.release();
        self.source.open(&constraints)?;
        log::info!(
            "Camera acquired: facing={} ideal={}x{}",
            constraints.facing_mode,
            constraints.ideal_width,
            constraints.ideal_height
        );
        self.active = Some(constraints);
        Ok(())
    }

    pub fn capture(&mut self) -> Result<Frame, CameraError> {
        if self.active.is_none() {
            return Err(CameraError::NotStreaming);
        }
        self.source.capture_still()
    }

    /// Release the device if held. Close failures are logged, never raised.
    pub fn release(&mut self) {
        if self.active.take().is_some() {
            match self.source.close() {
                Ok(()) => log::info!("Camera released"),
                Err(e) => log::warn!("Failed to release camera: {}", e),
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_constraints(&self) -> Option<&CameraConstraints> {
        self.active.as_ref()
    }

    pub fn source(&self) -> &C {
        &self.source
    }
}

impl<C: CameraSource> Drop for ScopedCamera<C> {
    fn drop(&mut self) {
        self.release();
    }
}
