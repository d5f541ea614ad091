//! Persistent similarity index over cache entries.
//!
//! [`SimilarityIndex`] is the injected seam between the enrichment pipeline
//! and the backing vector store, so tests can run against an in-memory SQLite
//! database (or any other implementation) without a network. The production
//! implementation is [`SqliteVecIndex`], backed by a vec0 virtual table.
//!
//! Scores are **cosine similarity** in `[-1, 1]`. Stored vectors are
//! L2-normalized by the embedder; sqlite-vec KNN returns L2 distance, which
//! is converted via [`super::l2_distance_to_cosine`]. The configured
//! similarity threshold is interpreted in this cosine space.

use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};

use super::types::{CacheEntry, EntryKind, ScoredEntry};
use super::{embedding_to_bytes, l2_distance_to_cosine};
use crate::error::StorageError;

/// Nearest-neighbor store of (vector, entry) pairs. Append-only from this
/// crate's perspective; eviction and compaction are an external concern.
pub trait SimilarityIndex: Send + Sync {
    /// Return up to `k` entries ordered by descending similarity to `vector`.
    /// An empty index yields an empty vec, not an error.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>, StorageError>;

    /// Durably persist an entry and its vector. Idempotent with respect to
    /// `entry.id`: re-inserting an existing id is a no-op, never corruption.
    fn insert(&self, entry: &CacheEntry, vector: &[f32]) -> Result<(), StorageError>;
}

/// sqlite-vec backed index over one named collection (a metadata table plus
/// its `{collection}_vec` vec0 table, created by [`crate::db`]).
pub struct SqliteVecIndex {
    conn: Arc<Mutex<Connection>>,
    table: String,
    vec_table: String,
}

impl SqliteVecIndex {
    /// `collection` must match the name the database was opened with; the
    /// table pair is derived from it.
    pub fn new(conn: Arc<Mutex<Connection>>, collection: &str) -> Self {
        Self {
            conn,
            table: collection.to_string(),
            vec_table: format!("{collection}_vec"),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

impl SimilarityIndex for SqliteVecIndex {
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>, StorageError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;

        let sql = format!(
            "SELECT v.id, v.distance, t.title, t.artifact, t.kind, t.created_at \
             FROM {vec} v \
             JOIN {meta} t ON t.id = v.id \
             WHERE v.embedding MATCH ?1 AND v.k = ?2 \
             ORDER BY v.distance",
            vec = self.vec_table,
            meta = self.table,
        );
        let mut stmt = conn.prepare(&sql)?;

        let rows = stmt.query_map(params![embedding_to_bytes(vector), k as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, distance, title, artifact, kind, created_at) = row?;
            let kind = kind.parse().unwrap_or(EntryKind::TitleImage);
            results.push(ScoredEntry {
                score: l2_distance_to_cosine(distance),
                entry: CacheEntry {
                    id,
                    title,
                    artifact_ref: artifact,
                    kind,
                    created_at,
                },
            });
        }
        Ok(results)
    }

    fn insert(&self, entry: &CacheEntry, vector: &[f32]) -> Result<(), StorageError> {
        let conn = self.lock()?;

        // Metadata row first, vector second; OR IGNORE keeps a duplicate id
        // from corrupting either table.
        conn.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (id, title, kind, artifact, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table
            ),
            params![
                entry.id,
                entry.title,
                entry.kind.as_str(),
                entry.artifact_ref,
                entry.created_at,
            ],
        )?;

        let already_present: bool = conn.query_row(
            &format!("SELECT COUNT(*) > 0 FROM {} WHERE id = ?1", self.vec_table),
            params![entry.id],
            |row| row.get(0),
        )?;
        if !already_present {
            conn.execute(
                &format!(
                    "INSERT INTO {} (id, embedding) VALUES (?1, ?2)",
                    self.vec_table
                ),
                params![entry.id, embedding_to_bytes(vector)],
            )?;
        }

        tracing::debug!(id = %entry.id, title = %entry.title, "cache entry persisted");
        Ok(())
    }
}
