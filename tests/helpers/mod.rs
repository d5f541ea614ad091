#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use vignette::cache::index::{SimilarityIndex, SqliteVecIndex};
use vignette::cache::types::{CacheEntry, ScoredEntry};
use vignette::db;
use vignette::embedding::{EmbeddingProvider, EMBEDDING_DIM};
use vignette::error::{EmbeddingError, GenerationError, StorageError};

/// Fresh in-memory index backed by a real sqlite-vec database, using the
/// default collection name.
pub fn test_index() -> SqliteVecIndex {
    let conn = db::open_memory_database("titles").unwrap();
    SqliteVecIndex::new(Arc::new(Mutex::new(conn)), "titles")
}

/// Index over a caller-supplied connection (for durability tests on disk and
/// non-default collections).
pub fn index_over(conn: Connection, collection: &str) -> SqliteVecIndex {
    SqliteVecIndex::new(Arc::new(Mutex::new(conn)), collection)
}

/// Deterministic 384-dim unit vector with a spike at position `seed`.
/// Distinct seeds are orthogonal.
pub fn unit_vec(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = 1.0;
    v
}

/// A unit vector with high (but not perfect) cosine similarity to `base`.
pub fn near_vec(base: &[f32]) -> Vec<f32> {
    let mut v = base.to_vec();
    for i in 0..5 {
        v[(i * 37) % EMBEDDING_DIM] += 0.05;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    for x in &mut v {
        *x /= norm;
    }
    v
}

/// Embedder that derives a deterministic spike vector from the text bytes.
/// The same title always embeds identically; distinct short titles land on
/// distinct (orthogonal) spikes.
pub struct MockEmbedder;

impl EmbeddingProvider for MockEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let seed: usize = text.bytes().map(|b| b as usize).sum();
        Ok(unit_vec(seed))
    }
}

/// Embedder that always fails, for per-title isolation tests.
pub struct FailingEmbedder;

impl EmbeddingProvider for FailingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Inference("mock inference failure".into()))
    }
}

/// Generator returning a deterministic data URI per prompt and counting calls.
pub struct MockGenerator {
    pub calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl vignette::generate::ImageGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("data:image/jpeg;base64,img-{prompt}"))
    }
}

/// Generator that always fails with a backend error.
pub struct FailingGenerator;

#[async_trait]
impl vignette::generate::ImageGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Backend {
            status: 500,
            body: "mock backend failure".into(),
        })
    }
}

/// Index wrapper whose writes always fail, for remember-failure tests.
pub struct ReadOnlyIndex<I: SimilarityIndex> {
    pub inner: I,
}

impl<I: SimilarityIndex> SimilarityIndex for ReadOnlyIndex<I> {
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>, StorageError> {
        self.inner.query(vector, k)
    }

    fn insert(&self, _entry: &CacheEntry, _vector: &[f32]) -> Result<(), StorageError> {
        Err(StorageError::LockPoisoned)
    }
}

/// Index that fails every operation, for query-degradation tests.
pub struct BrokenIndex;

impl SimilarityIndex for BrokenIndex {
    fn query(&self, _vector: &[f32], _k: usize) -> Result<Vec<ScoredEntry>, StorageError> {
        Err(StorageError::LockPoisoned)
    }

    fn insert(&self, _entry: &CacheEntry, _vector: &[f32]) -> Result<(), StorageError> {
        Err(StorageError::LockPoisoned)
    }
}
