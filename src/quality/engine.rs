use crate::errors::QualityError;
use tokio::sync::OnceCell;

/// 4-neighbour Laplacian.
pub const LAPLACIAN_4: [[i32; 3]; 3] = [[0, 1, 0], [1, -4, 1], [0, 1, 0]];

/// Convolution kernels prepared when the engine loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineKernels {
    pub laplacian: [[i32; 3]; 3],
}

impl Default for EngineKernels {
    fn default() -> Self {
        Self {
            laplacian: LAPLACIAN_4,
        }
    }
}

/// Image-processing capability, loaded lazily and at most once.
///
/// Construct one per application and share it; nothing in the crate keeps
/// a process-wide instance.
#[derive(Debug, Default)]
pub struct VisionEngine {
    kernels: OnceCell<EngineKernels>,
}

impl VisionEngine {
    /// An engine that still has to be loaded.
    pub fn new() -> Self {
        Self {
            kernels: OnceCell::new(),
        }
    }

    /// An engine that is ready immediately.
    pub fn preloaded() -> Self {
        Self {
            kernels: OnceCell::new_with(Some(EngineKernels::default())),
        }
    }

    /// Load the engine. Concurrent callers wait for the same initialisation.
    pub async fn load(&self) -> &EngineKernels {
        self.kernels
            .get_or_init(|| async {
                log::info!("Vision engine loaded");
                EngineKernels::default()
            })
            .await
    }

    pub fn is_ready(&self) -> bool {
        self.kernels.initialized()
    }

    pub fn kernels(&self) -> Result<&EngineKernels, QualityError> {
        self.kernels.get().ok_or(QualityError::EngineNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_engine_not_ready_until_loaded() {
        let engine = VisionEngine::new();
        assert!(!engine.is_ready());
        assert_eq!(engine.kernels(), Err(QualityError::EngineNotReady));

        engine.load().await;
        assert!(engine.is_ready());
        assert_eq!(engine.kernels().unwrap().laplacian, LAPLACIAN_4);
    }

    #[test]
    fn test_preloaded_engine_is_ready() {
        assert!(VisionEngine::preloaded().is_ready());
    }
}
