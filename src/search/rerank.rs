//! Weighted re-ranking (part of C7).
//!
//! A weighted sum of the four signal scores, an exact-substring boost,
//! and a floor filter. Kept as pure functions over `SearchResult` so
//! `search::engine` stays a thin orchestration layer.

use crate::config::RankingWeights;
use crate::store::model::SearchResult;

/// Scores below this are dropped entirely rather than just ranked low.
pub const FLOOR_THRESHOLD: f32 = 0.1;

/// Exact-substring hits get multiplied by this, capped at 1.0.
const SUBSTRING_BOOST: f32 = 1.2;

/// `w_v·vector + w_g·graph·(1/max(distance,1)) + w_i·intent + w_l·language`.
pub fn combined_score(result: &SearchResult, weights: &RankingWeights) -> f32 {
    let graph_distance_factor = 1.0 / (result.graph_distance.max(1) as f32);
    weights.vector() * result.vector_score
        + weights.graph() * result.graph_score * graph_distance_factor
        + weights.intent() * result.intent_score
        + weights.language() * result.language_score
}

/// If `result.content` contains `query_text` verbatim (case-insensitive),
/// multiply its combined score by 1.2, capped at 1.0.
pub fn apply_substring_boost(result: &mut SearchResult, query_text: &str) {
    if query_text.trim().is_empty() {
        return;
    }
    if result
        .content
        .to_lowercase()
        .contains(&query_text.to_lowercase())
    {
        result.combined_score = (result.combined_score * SUBSTRING_BOOST).min(1.0);
    }
}

/// Drop anything scoring below [`FLOOR_THRESHOLD`], then stable-sort by
/// `combined_score` descending, ties broken by `chunk_hash` ascending.
pub fn rank_and_filter(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    results.retain(|r| r.combined_score >= FLOOR_THRESHOLD);
    results.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_hash.cmp(&b.chunk_hash))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::ResultType;

    fn base_result() -> SearchResult {
        SearchResult {
            chunk_hash: "abc123".to_string(),
            content: "the quick brown fox".to_string(),
            language: "en".to_string(),
            source_doc: "doc.txt".to_string(),
            vector_score: 0.5,
            graph_score: 0.0,
            intent_score: 0.0,
            language_score: 0.0,
            combined_score: 0.0,
            result_type: ResultType::Vector,
            intent_name: None,
            phase_name: None,
            graph_distance: 0,
            related_intents: vec![],
            metadata: Default::default(),
        }
    }

    #[test]
    fn combined_score_weights_all_four_signals() {
        let weights = RankingWeights::default();
        let mut r = base_result();
        r.vector_score = 1.0;
        r.graph_score = 1.0;
        r.graph_distance = 2;
        r.intent_score = 1.0;
        r.language_score = 1.0;
        let score = combined_score(&r, &weights);
        assert!((score - (0.40 + 0.30 * 0.5 + 0.20 + 0.10)).abs() < 1e-6);
    }

    #[test]
    fn substring_boost_caps_at_one() {
        let mut r = base_result();
        r.combined_score = 0.9;
        apply_substring_boost(&mut r, "quick brown");
        assert_eq!(r.combined_score, 1.0);
    }

    #[test]
    fn substring_boost_is_case_insensitive_and_noop_on_miss() {
        let mut r = base_result();
        r.combined_score = 0.5;
        apply_substring_boost(&mut r, "QUICK");
        assert!((r.combined_score - 0.6).abs() < 1e-6);

        let mut r2 = base_result();
        r2.combined_score = 0.5;
        apply_substring_boost(&mut r2, "elephant");
        assert_eq!(r2.combined_score, 0.5);
    }

    #[test]
    fn floor_filter_drops_low_scores_and_sorts_remaining() {
        let mut low = base_result();
        low.chunk_hash = "zzz".to_string();
        low.combined_score = 0.05;

        let mut mid = base_result();
        mid.chunk_hash = "bbb".to_string();
        mid.combined_score = 0.5;

        let mut high = base_result();
        high.chunk_hash = "aaa".to_string();
        high.combined_score = 0.5;

        let ranked = rank_and_filter(vec![low, mid, high]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk_hash, "aaa");
        assert_eq!(ranked[1].chunk_hash, "bbb");
    }
}
