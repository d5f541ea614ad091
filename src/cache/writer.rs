//! Write path — remember a freshly generated artifact for future reuse.

use thiserror::Error;

use super::index::SimilarityIndex;
use super::types::CacheEntry;
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingError, StorageError};

/// Why a remember call failed. The orchestrator logs both and keeps the
/// artifact either way; the distinction exists for observability.
#[derive(Debug, Error)]
pub enum RememberError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Embed `title`, build a [`CacheEntry`] with a fresh id, and persist it.
///
/// Not transactional with generation: callers hold the artifact already and
/// lose only the future-reuse benefit if this fails. Returns the persisted
/// entry so callers can surface the stored id.
pub fn remember(
    embedder: &dyn EmbeddingProvider,
    index: &dyn SimilarityIndex,
    title: &str,
    artifact_ref: &str,
) -> Result<CacheEntry, RememberError> {
    let vector = embedder.embed(title)?;
    let entry = CacheEntry::new(title, artifact_ref);
    index.insert(&entry, &vector)?;

    tracing::info!(id = %entry.id, title, "remembered generated image");
    Ok(entry)
}
