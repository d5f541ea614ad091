//! The semantic artifact cache: types, similarity index, decision policy, and
//! the write path that remembers freshly generated artifacts.

pub mod index;
pub mod policy;
pub mod types;
pub mod writer;

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Convert an L2 distance between unit vectors to cosine similarity.
///
/// For unit vectors, `d² = 2 − 2·cos`, so `cos = 1 − d²/2`. This is the
/// similarity score reported by the index and the space the configured
/// threshold lives in.
pub fn l2_distance_to_cosine(distance: f64) -> f64 {
    1.0 - (distance * distance) / 2.0
}
