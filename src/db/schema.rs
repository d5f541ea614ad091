//! SQL DDL for a cache collection.
//!
//! Each collection is a table pair named after `storage.collection`: a
//! metadata table holding the entry fields and a `{collection}_vec` vec0
//! virtual table holding the embedding. Rows are joined by `id`. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization. The store is append-only:
//! nothing in this crate updates or deletes rows.

use anyhow::Result;
use rusqlite::Connection;

/// A collection name must be usable as a bare SQLite identifier, since it is
/// spliced into DDL and queries.
pub fn is_valid_collection(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Metadata side of a cache collection.
fn metadata_ddl(collection: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS {collection} (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'title-image' CHECK(kind IN ('title-image')),
    artifact TEXT NOT NULL CHECK(length(artifact) > 0),
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_{collection}_kind ON {collection}(kind);
"#
    )
}

/// vec0 virtual table must be created separately (sqlite-vec syntax).
/// Dimensionality is fixed at 384 (all-MiniLM-L6-v2) and must match every
/// vector ever inserted.
fn vec_ddl(collection: &str) -> String {
    format!(
        r#"
CREATE VIRTUAL TABLE IF NOT EXISTS {collection}_vec USING vec0(
    id TEXT PRIMARY KEY,
    embedding FLOAT[384]
);
"#
    )
}

/// Initialize the table pair for `collection`. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection, collection: &str) -> Result<()> {
    anyhow::ensure!(
        is_valid_collection(collection),
        "invalid collection name {collection:?}: must be an identifier ([A-Za-z_][A-Za-z0-9_]*)"
    );
    conn.execute_batch(&metadata_ddl(collection))?;
    conn.execute_batch(&vec_ddl(collection))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_collection_table_pair() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "titles").unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"titles".to_string()));

        // Verify the vec extension is live
        let version: String = conn
            .query_row("SELECT vec_version()", [], |r| r.get(0))
            .unwrap();
        assert!(!version.is_empty());
    }

    #[test]
    fn schema_respects_configured_collection_name() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "unit_art").unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = 'unit_art'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn schema_is_idempotent() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "titles").unwrap();
        init_schema(&conn, "titles").unwrap(); // second call should not error
    }

    #[test]
    fn invalid_collection_names_rejected() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        assert!(init_schema(&conn, "").is_err());
        assert!(init_schema(&conn, "titles; DROP TABLE x").is_err());
        assert!(init_schema(&conn, "1titles").is_err());
        assert!(init_schema(&conn, "unit-images").is_err());
    }

    #[test]
    fn collection_name_validation() {
        assert!(is_valid_collection("titles"));
        assert!(is_valid_collection("_private"));
        assert!(is_valid_collection("unit_art2"));
        assert!(!is_valid_collection(""));
        assert!(!is_valid_collection("9lives"));
        assert!(!is_valid_collection("has space"));
    }

    #[test]
    fn empty_artifact_rejected() {
        crate::db::load_sqlite_vec();
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "titles").unwrap();

        let result = conn.execute(
            "INSERT INTO titles (id, title, kind, artifact, created_at) \
             VALUES ('x', 'T', 'title-image', '', '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
