/// Frame quality evaluation
///
/// Scores a captured frame's sharpness and classifies it blurry when the
/// score falls below a fixed threshold. The Laplacian algorithm needs the
/// [`VisionEngine`] to be loaded first; evaluating before that is an error.
pub mod blur;
pub mod engine;
pub mod evaluator;

pub use blur::{laplacian_variance, pixel_diff_score};
pub use engine::{EngineKernels, VisionEngine};
pub use evaluator::QualityEvaluator;
