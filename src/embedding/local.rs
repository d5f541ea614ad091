//! Local ONNX Runtime embedding provider.
//!
//! Implements [`EmbeddingProvider`] using the all-MiniLM-L6-v2 model via
//! `ort`: tokenization with truncation, inference, attention-masked mean
//! pooling, and L2 normalization.

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;

/// Maximum sequence length for all-MiniLM-L6-v2 (trained at 256).
const MAX_SEQ_LEN: usize = 256;

/// Local ONNX-based embedding provider using all-MiniLM-L6-v2.
pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

// Safety: Tokenizer is Send+Sync. Session is behind a Mutex.
// The Mutex guarantees exclusive access during run().
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let cache_dir = crate::config::expand_tilde(&config.cache_dir);
        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `vignette model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Run `vignette model download` first.",
            tokenizer_path.display()
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)?
            .with_intra_threads(4)
            .map_err(ort::Error::<()>::from)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        tracing::info!(model = %model_path.display(), "ONNX model loaded");

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;

        tracing::info!(tokenizer = %tokenizer_path.display(), "tokenizer loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    /// Run inference for a single tokenized input and return the raw token
    /// embeddings plus the attention mask.
    fn run_inference(
        &self,
        ids: &[u32],
        mask: &[u32],
    ) -> Result<(Vec<f32>, usize), EmbeddingError> {
        let seq_len = ids.len();
        let shape = vec![1i64, seq_len as i64];

        let input_ids: Vec<i64> = ids.iter().map(|&v| v as i64).collect();
        let attention_mask: Vec<i64> = mask.iter().map(|&v| v as i64).collect();
        let token_type_ids = vec![0i64; seq_len];

        let input_ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.into_boxed_slice()))
                .map_err(|e| EmbeddingError::Inference(e.to_string()))?;
        let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| EmbeddingError::Inference(format!("session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs! {
                "input_ids" => input_ids_tensor,
                "attention_mask" => attention_mask_tensor,
                "token_type_ids" => token_type_ids_tensor,
            })
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        // Output name varies by ONNX export. Try common names, fall back to index 0.
        let token_emb = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);

        let (out_shape, data) = token_emb
            .try_extract_tensor::<f32>()
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        let dims: &[i64] = &out_shape;
        if dims.len() != 3 || dims[2] != EMBEDDING_DIM as i64 {
            return Err(EmbeddingError::Inference(format!(
                "unexpected token_embeddings shape: {dims:?}, expected [1, seq, {EMBEDDING_DIM}]"
            )));
        }

        Ok((data.to_vec(), dims[1] as usize))
    }
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::Tokenize(e.to_string()))?;

        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();

        let (token_embeddings, seq_len) = self.run_inference(ids, mask)?;

        let pooled = mean_pool(&token_embeddings, mask, seq_len);
        Ok(l2_normalize(&pooled))
    }
}

/// Attention-masked mean pooling over token embeddings of shape [seq, dim].
fn mean_pool(token_embeddings: &[f32], mask: &[u32], seq_len: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; EMBEDDING_DIM];
    let mut count = 0.0f32;

    for s in 0..seq_len {
        if mask.get(s).copied().unwrap_or(0) == 0 {
            continue;
        }
        let offset = s * EMBEDDING_DIM;
        for d in 0..EMBEDDING_DIM {
            sum[d] += token_embeddings[offset + d];
        }
        count += 1.0;
    }

    if count > 0.0 {
        for v in &mut sum {
            *v /= count;
        }
    }
    sum
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
