//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and a local implementation using
//! all-MiniLM-L6-v2 (384 dimensions, L2-normalized). Cosine scores elsewhere
//! in the crate rely on every provider producing unit-length vectors.

pub mod local;

use crate::error::EmbeddingError;

/// Number of dimensions in the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into vectors.
///
/// Implementations must be deterministic (same text, same vector) and produce
/// L2-normalized vectors of exactly [`EMBEDDING_DIM`] dimensions. Embedding is
/// synchronous; callers on async paths may use `tokio::task::spawn_blocking`
/// if inference latency ever matters.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    ///
    /// Empty or whitespace-only input is rejected with
    /// [`EmbeddingError::EmptyInput`]. Over-long input is truncated at the
    /// model's maximum sequence length, never an error.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported (ONNX Runtime + all-MiniLM-L6-v2).
/// Returns an error if model files are not found — run `vignette model download`
/// first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}
