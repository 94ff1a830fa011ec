//! Vector similarity utilities.
//!
//! Pure-Rust implementations of:
//! - Cosine similarity
//! - Top-k ranking of index records against a query embedding

use cvagent_core::index::{IndexMatch, IndexRecord};

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty, or holds a NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    let sim = dot / denom;
    if denom < 1e-10 || sim.is_nan() {
        return 0.0;
    }

    sim as f32
}

/// Rank records by cosine similarity to a query embedding.
///
/// Returns at most `top_k` matches sorted by descending similarity. Ties keep
/// insertion order.
pub fn rank_records(records: &[IndexRecord], query: &[f32], top_k: usize) -> Vec<IndexMatch> {
    let mut scored: Vec<IndexMatch> = records
        .iter()
        .map(|record| IndexMatch {
            id: record.id.clone(),
            score: cosine_similarity(&record.values, query),
            text: record.text.clone(),
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}
