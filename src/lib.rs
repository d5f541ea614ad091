//! Learning-path image enrichment with a semantic artifact cache.
//!
//! `vignette` fetches a remote learning-path document and attaches an
//! illustrative image to each leading unit. Image generation is expensive, so
//! every generated image is remembered in a vector store keyed by the unit
//! title's embedding; future titles close enough in meaning reuse the stored
//! image instead of generating a new one.
//!
//! # Architecture
//!
//! - **Embeddings**: local ONNX Runtime with all-MiniLM-L6-v2 (384
//!   dimensions, L2-normalized)
//! - **Storage**: SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec)
//!   for nearest-neighbor search; scores are cosine similarity
//! - **Generation**: Together-style image backend over HTTP (FLUX.1-schnell)
//! - **Transport**: axum HTTP server with two learning-path endpoints
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization and schema
//! - [`embedding`] — Text-to-vector embedding pipeline via ONNX Runtime
//! - [`cache`] — The semantic cache: similarity index, decision policy, write path
//! - [`generate`] — Remote image generation client
//! - [`enrich`] — Per-title orchestration with a hard generation budget
//! - [`learning_path`] — Upstream document fetch and shaping
//! - [`server`] — HTTP service wrapper

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod embedding;
pub mod enrich;
pub mod error;
pub mod generate;
pub mod learning_path;
pub mod server;
