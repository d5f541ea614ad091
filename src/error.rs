//! Error taxonomy for the semantic cache pipeline.
//!
//! Three classes, because the orchestrator treats them differently:
//! [`EmbeddingError`] and [`GenerationError`] abort enrichment for a single
//! title, [`StorageError`] on a query degrades to "no match" and on a write is
//! swallowed after logging. Plumbing code (config, server bootstrap, CLI)
//! stays on `anyhow`.

use thiserror::Error;

/// Bad input to, or failure inside, the embedding pipeline.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty input")]
    EmptyInput,
    #[error("tokenization failed: {0}")]
    Tokenize(String),
    #[error("embedding inference failed: {0}")]
    Inference(String),
}

/// The vector store is unreachable or rejected a read/write.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("vector store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("vector store connection lock poisoned")]
    LockPoisoned,
}

/// The generation backend failed or returned a malformed response.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
}
