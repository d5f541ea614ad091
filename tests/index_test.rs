mod helpers;

use helpers::{index_over, near_vec, test_index, unit_vec};
use vignette::cache::index::{SimilarityIndex, SqliteVecIndex};
use vignette::cache::types::{CacheEntry, EntryKind};
use vignette::db;

#[test]
fn query_on_empty_index_returns_empty() {
    let index = test_index();
    let results = index.query(&unit_vec(0), 1).unwrap();
    assert!(results.is_empty());
}

#[test]
fn query_with_zero_k_returns_empty() {
    let index = test_index();
    index
        .insert(&CacheEntry::new("Algebra", "data:image/jpeg;base64,AAA"), &unit_vec(0))
        .unwrap();
    assert!(index.query(&unit_vec(0), 0).unwrap().is_empty());
}

#[test]
fn self_query_scores_max_similarity() {
    let index = test_index();
    let vector = unit_vec(7);
    let entry = CacheEntry::new("Intro to Algebra", "data:image/jpeg;base64,AAA");
    index.insert(&entry, &vector).unwrap();

    let results = index.query(&vector, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert!(
        (results[0].score - 1.0).abs() < 1e-5,
        "self-similarity should be ~1.0, got {}",
        results[0].score
    );
    assert_eq!(results[0].entry.id, entry.id);
    assert_eq!(results[0].entry.title, "Intro to Algebra");
    assert_eq!(results[0].entry.artifact_ref, "data:image/jpeg;base64,AAA");
    assert_eq!(results[0].entry.kind, EntryKind::TitleImage);
}

#[test]
fn results_ordered_by_descending_similarity() {
    let index = test_index();
    let base = unit_vec(0);

    let near = CacheEntry::new("Algebra basics", "data:image/jpeg;base64,NEAR");
    index.insert(&near, &near_vec(&base)).unwrap();

    let far = CacheEntry::new("Coral reefs", "data:image/jpeg;base64,FAR");
    index.insert(&far, &unit_vec(100)).unwrap();

    let results = index.query(&base, 2).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].entry.id, near.id);
    assert_eq!(results[1].entry.id, far.id);
    assert!(results[0].score > results[1].score);
    // Orthogonal spike vectors have cosine similarity ~0
    assert!(results[1].score.abs() < 1e-5);
}

#[test]
fn query_respects_k() {
    let index = test_index();
    for seed in 0..5 {
        index
            .insert(
                &CacheEntry::new(format!("Unit {seed}"), "data:image/jpeg;base64,AAA"),
                &unit_vec(seed),
            )
            .unwrap();
    }

    let results = index.query(&unit_vec(0), 3).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn insert_same_id_twice_is_idempotent() {
    let index = test_index();
    let vector = unit_vec(3);
    let entry = CacheEntry::new("Fractions", "data:image/jpeg;base64,AAA");

    index.insert(&entry, &vector).unwrap();
    index.insert(&entry, &vector).unwrap();

    let results = index.query(&vector, 10).unwrap();
    assert_eq!(results.len(), 1, "duplicate id must not create a second row");
}

#[test]
fn duplicate_titles_with_fresh_ids_both_persist() {
    // Concurrent misses for the same title produce distinct entries; that is
    // accepted redundancy, and both must survive.
    let index = test_index();
    let vector = unit_vec(9);

    index
        .insert(&CacheEntry::new("Geometry", "data:image/jpeg;base64,ONE"), &vector)
        .unwrap();
    index
        .insert(&CacheEntry::new("Geometry", "data:image/jpeg;base64,TWO"), &vector)
        .unwrap();

    let results = index.query(&vector, 10).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cache.db");
    let vector = unit_vec(5);

    let entry = CacheEntry::new("Decimals", "data:image/jpeg;base64,AAA");
    {
        let index = index_over(db::open_database(&db_path, "titles").unwrap(), "titles");
        index.insert(&entry, &vector).unwrap();
    }

    let index: SqliteVecIndex = index_over(db::open_database(&db_path, "titles").unwrap(), "titles");
    let results = index.query(&vector, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entry.id, entry.id);
    assert_eq!(results[0].entry.artifact_ref, "data:image/jpeg;base64,AAA");
}

#[test]
fn configured_collection_addresses_its_own_table_pair() {
    let conn = db::open_memory_database("unit_art").unwrap();

    // The table pair derives from the collection name
    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE name LIKE 'unit_art%' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert!(tables.contains(&"unit_art".to_string()));

    let index = index_over(conn, "unit_art");
    let vector = unit_vec(11);
    let entry = CacheEntry::new("Statistics", "data:image/jpeg;base64,AAA");
    index.insert(&entry, &vector).unwrap();

    let results = index.query(&vector, 1).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].entry.id, entry.id);
}
