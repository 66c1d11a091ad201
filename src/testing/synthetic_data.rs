//! Synthetic frames with known sharpness
//!
//! A checkerboard has hard edges everywhere and scores far above any sane
//! threshold; a uniform image scores exactly zero. JPEG keeps both
//! properties because the 8px cells line up with the codec's blocks.

use crate::types::{Frame, MIME_JPEG};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageResult, Rgb, RgbImage};

pub const SYNTHETIC_WIDTH: u32 = 160;
pub const SYNTHETIC_HEIGHT: u32 = 120;
const JPEG_QUALITY: u8 = 90;

/// Black and white cells of `cell_size` pixels.
pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> RgbImage {
    let cell_size = cell_size.max(1);
    RgbImage::from_fn(width, height, |x, y| {
        if (x / cell_size + y / cell_size) % 2 == 0 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    })
}

pub fn uniform_gray(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
}

/// Smooth left-to-right ramp: not flat, but with no edges to speak of.
pub fn horizontal_gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        let value = ((255 * x) / width.max(1)) as u8;
        Rgb([value, value, value])
    })
}

pub fn encode_jpeg(image: &RgbImage) -> ImageResult<Vec<u8>> {
    let mut data = Vec::new();
    JpegEncoder::new_with_quality(&mut data, JPEG_QUALITY).encode_image(image)?;
    Ok(data)
}

fn frame_from(image: &RgbImage, device_id: &str) -> ImageResult<Frame> {
    Ok(Frame::new(encode_jpeg(image)?, MIME_JPEG)
        .with_dimensions(image.width(), image.height())
        .with_device(device_id))
}

/// A frame that every algorithm classifies as sharp.
pub fn sharp_frame() -> ImageResult<Frame> {
    frame_from(
        &checkerboard(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT, 8),
        "synthetic_checkerboard",
    )
}

/// A uniform mid-gray frame: zero variance under every algorithm.
pub fn flat_frame() -> ImageResult<Frame> {
    frame_from(
        &uniform_gray(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT, 128),
        "synthetic_gray",
    )
}

pub fn gradient_frame() -> ImageResult<Frame> {
    frame_from(
        &horizontal_gradient(SYNTHETIC_WIDTH, SYNTHETIC_HEIGHT),
        "synthetic_gradient",
    )
}

/// Bytes that claim to be a JPEG but cannot be decoded.
pub fn corrupt_frame() -> Frame {
    Frame::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46], MIME_JPEG)
        .with_device("synthetic_corrupt")
}
