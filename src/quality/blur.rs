//! Sharpness proxies over decoded pixels
//!
//! Both functions are deterministic and return a variance-like value where
//! higher means sharper. A flat image scores exactly zero under either.

use crate::errors::QualityError;
use image::{GrayImage, RgbImage};

/// Variance of the Laplacian response over the interior of `gray`.
pub fn laplacian_variance(gray: &GrayImage, kernel: &[[i32; 3]; 3]) -> Result<f64, QualityError> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return Err(QualityError::TooSmall { width, height });
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut response = 0i32;
            for (ky, row) in kernel.iter().enumerate() {
                for (kx, weight) in row.iter().enumerate() {
                    if *weight == 0 {
                        continue;
                    }
                    let px = gray.get_pixel(x + kx as u32 - 1, y + ky as u32 - 1)[0];
                    response += weight * px as i32;
                }
            }
            let value = response as f64;
            sum += value;
            sum_sq += value * value;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    Ok((sum_sq / n - mean * mean).max(0.0))
}

/// Mean squared difference between red values `stride` pixels apart on each row.
pub fn pixel_diff_score(rgb: &RgbImage, stride: u32) -> Result<f64, QualityError> {
    let (width, height) = rgb.dimensions();
    let stride = stride.max(1);
    if width <= stride || height == 0 {
        return Err(QualityError::TooSmall { width, height });
    }

    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 0..height {
        let mut x = 0;
        while x + stride < width {
            let a = rgb.get_pixel(x, y)[0] as f64;
            let b = rgb.get_pixel(x + stride, y)[0] as f64;
            sum_sq += (b - a) * (b - a);
            count += 1;
            x += stride;
        }
    }

    Ok(sum_sq / count as f64)
}
