use super::blur::{laplacian_variance, pixel_diff_score};
use super::engine::VisionEngine;
use crate::config::QualityConfig;
use crate::errors::QualityError;
use crate::types::{BlurAlgorithm, Frame, QualityScore};
use image::DynamicImage;
use std::sync::Arc;

/// Scores frames with one algorithm against one threshold.
#[derive(Debug, Clone)]
pub struct QualityEvaluator {
    engine: Arc<VisionEngine>,
    algorithm: BlurAlgorithm,
    threshold: f64,
    stride: u32,
}

impl QualityEvaluator {
    pub fn new(engine: Arc<VisionEngine>, config: &QualityConfig) -> Self {
        Self {
            engine,
            algorithm: config.algorithm,
            threshold: config.threshold(),
            stride: config.pixel_diff_stride,
        }
    }

    pub fn algorithm(&self) -> BlurAlgorithm {
        self.algorithm
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn engine(&self) -> &Arc<VisionEngine> {
        &self.engine
    }

    /// Decode `frame` on the blocking pool and classify it.
    ///
    /// Undecodable input is an error, never a pass.
    pub async fn evaluate(&self, frame: &Frame) -> Result<QualityScore, QualityError> {
        let kernel = match self.algorithm {
            BlurAlgorithm::Laplacian => Some(self.engine.kernels()?.laplacian),
            BlurAlgorithm::PixelDiff => None,
        };

        let data = frame.data.clone();
        let algorithm = self.algorithm;
        let stride = self.stride;
        let variance = tokio::task::spawn_blocking(move || {
            let image = image::load_from_memory(&data)
                .map_err(|e| QualityError::Decode(e.to_string()))?;
            score_image(&image, algorithm, kernel.as_ref(), stride)
        })
        .await
        .map_err(|e| QualityError::Task(e.to_string()))??;

        let score = QualityScore::classify(variance, self.threshold, self.algorithm);
        log::debug!(
            "Quality {:?}: variance={:.2} threshold={:.2} blurry={}",
            score.algorithm,
            score.variance,
            score.threshold,
            score.is_blurry
        );
        Ok(score)
    }
}

fn score_image(
    image: &DynamicImage,
    algorithm: BlurAlgorithm,
    kernel: Option<&[[i32; 3]; 3]>,
    stride: u32,
) -> Result<f64, QualityError> {
    match (algorithm, kernel) {
        (BlurAlgorithm::Laplacian, Some(kernel)) => laplacian_variance(&image.to_luma8(), kernel),
        (BlurAlgorithm::Laplacian, None) => Err(QualityError::EngineNotReady),
        (BlurAlgorithm::PixelDiff, _) => pixel_diff_score(&image.to_rgb8(), stride),
    }
}
