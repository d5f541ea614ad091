//! Cache entry types.
//!
//! Defines [`CacheEntry`] (the unit of stored knowledge), [`EntryKind`] (the
//! artifact class tag, currently only title images), and [`ScoredEntry`]
//! (a query result with its similarity score).

use serde::{Deserialize, Serialize};

/// Artifact class stored in the cache. A single variant today; the tag exists
/// so the store can later hold other artifact classes without a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "title-image")]
    TitleImage,
}

impl EntryKind {
    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TitleImage => "title-image",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title-image" => Ok(Self::TitleImage),
            _ => Err(format!("unknown entry kind: {s}")),
        }
    }
}

/// A persisted cache entry. Append-only: an entry is written exactly once,
/// after a successful generation, and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// UUID v7, assigned at write time. Never reused, never content-derived.
    pub id: String,
    /// The text key that produced the artifact. Kept for observability;
    /// lookups go through the embedding, never this field.
    pub title: String,
    /// Opaque artifact reference — here a `data:image/jpeg;base64,...` URI.
    pub artifact_ref: String,
    /// Artifact class tag.
    pub kind: EntryKind,
    /// RFC 3339 write timestamp.
    pub created_at: String,
}

impl CacheEntry {
    /// Build a new entry with a fresh UUID v7 and the current timestamp.
    pub fn new(title: impl Into<String>, artifact_ref: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            title: title.into(),
            artifact_ref: artifact_ref.into(),
            kind: EntryKind::TitleImage,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A query result: a stored entry and its cosine similarity to the query
/// vector. Higher is more similar.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub score: f64,
    pub entry: CacheEntry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn entry_kind_round_trips_as_str() {
        assert_eq!(EntryKind::TitleImage.as_str(), "title-image");
        assert_eq!(
            EntryKind::from_str("title-image").unwrap(),
            EntryKind::TitleImage
        );
        assert!(EntryKind::from_str("thumbnail").is_err());
    }

    #[test]
    fn new_entries_get_distinct_ids() {
        let a = CacheEntry::new("Intro to Algebra", "data:image/jpeg;base64,AAA");
        let b = CacheEntry::new("Intro to Algebra", "data:image/jpeg;base64,AAA");
        assert_ne!(a.id, b.id, "ids are freshly generated, never content-derived");
        assert_eq!(a.kind, EntryKind::TitleImage);
        assert!(!a.created_at.is_empty());
    }
}
