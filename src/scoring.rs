//! Aggregate confidence scoring for an aligned track list.
//!
//! `score = match_ratio * 100 * (0.8 + 0.2 * count_ratio)`
//!
//! - `match_ratio`: matched / canonical
//! - `count_ratio`: min(canonical, candidate) / max(canonical, candidate)
//!
//! An oversized candidate whose matches are scattered is a hard zero, not a
//! penalty.

use crate::align::is_contiguous;
use crate::config::Thresholds;
use crate::models::{Track, TrackMatch};

// ============================================================================
// Weights
// ============================================================================

/// Share of the score that depends only on the match ratio.
pub const MATCH_RATIO_WEIGHT: f64 = 0.8;

/// Share of the score that rewards similar list lengths.
pub const COUNT_RATIO_WEIGHT: f64 = 0.2;

/// Minimum matches before contiguity is enforced on an oversized candidate.
pub const CONTIGUITY_MIN_MATCHES: usize = 2;

// ============================================================================
// Reasons
// ============================================================================

pub const REASON_SCATTERED: &str = "tracks scattered in larger candidate (not contiguous)";
pub const REASON_NO_MATCHES: &str = "no matching tracks found";

/// Score and categorical reason for one candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    pub reason: String,
    pub accepted: bool,
}

pub fn count_ratio(canonical_count: usize, candidate_count: usize) -> f64 {
    let max = canonical_count.max(candidate_count);
    if max == 0 {
        0.0
    } else {
        canonical_count.min(candidate_count) as f64 / max as f64
    }
}

/// Candidate is large enough relative to the canonical list that scattered
/// matches are suspicious.
pub fn is_oversized(canonical_count: usize, candidate_count: usize, matched: usize, thresholds: &Thresholds) -> bool {
    matched >= CONTIGUITY_MIN_MATCHES
        && candidate_count as f64 > canonical_count as f64 * thresholds.size_ratio_trigger
}

/// Score an alignment given the list sizes.
pub fn score_counts(
    canonical_count: usize,
    candidate_count: usize,
    matches: &[TrackMatch],
    thresholds: &Thresholds,
) -> ScoreOutcome {
    let matched = matches.len();
    if canonical_count == 0 || matched == 0 {
        return ScoreOutcome {
            score: 0.0,
            reason: REASON_NO_MATCHES.to_string(),
            accepted: false,
        };
    }

    if is_oversized(canonical_count, candidate_count, matched, thresholds)
        && !is_contiguous(matches, thresholds.max_position_gap)
    {
        return ScoreOutcome {
            score: 0.0,
            reason: REASON_SCATTERED.to_string(),
            accepted: false,
        };
    }

    let match_ratio = matched as f64 / canonical_count as f64;
    let score = match_ratio
        * 100.0
        * (MATCH_RATIO_WEIGHT + COUNT_RATIO_WEIGHT * count_ratio(canonical_count, candidate_count));

    let required = thresholds.min_matched_tracks.min(canonical_count);
    if matched >= required && score >= thresholds.min_match_score {
        ScoreOutcome {
            score,
            reason: format!("good match: {}/{} tracks matched", matched, canonical_count),
            accepted: true,
        }
    } else {
        ScoreOutcome {
            score,
            reason: format!(
                "below threshold: {}/{} tracks matched ({:.0}%)",
                matched, canonical_count, score
            ),
            accepted: false,
        }
    }
}

/// Score an alignment of `canonical` against `candidate`.
pub fn score(canonical: &[Track], candidate: &[Track], matches: &[TrackMatch], thresholds: &Thresholds) -> ScoreOutcome {
    score_counts(canonical.len(), candidate.len(), matches, thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_at(candidate_positions: &[u32]) -> Vec<TrackMatch> {
        candidate_positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| TrackMatch {
                canonical_title: format!("T{}", i + 1),
                canonical_position: i as u32 + 1,
                candidate_title: format!("T{}", i + 1),
                candidate_position: pos,
                candidate_index: pos as usize - 1,
                candidate_external_id: None,
                similarity: 100.0,
            })
            .collect()
    }

    #[test]
    fn test_count_ratio() {
        assert_eq!(count_ratio(3, 4), 0.75);
        assert_eq!(count_ratio(4, 3), 0.75);
        assert_eq!(count_ratio(0, 0), 0.0);
    }

    #[test]
    fn test_score_formula() {
        let outcome = score_counts(3, 4, &matches_at(&[1, 2, 4]), &Thresholds::default());
        assert!((outcome.score - 95.0).abs() < 1e-9);
        assert!(outcome.accepted);
        assert_eq!(outcome.reason, "good match: 3/3 tracks matched");
    }

    #[test]
    fn test_no_matches() {
        let outcome = score_counts(5, 5, &[], &Thresholds::default());
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reason, REASON_NO_MATCHES);
        assert!(!outcome.accepted);
    }

    #[test]
    fn test_empty_canonical() {
        let outcome = score_counts(0, 5, &[], &Thresholds::default());
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reason, REASON_NO_MATCHES);
    }

    #[test]
    fn test_scattered_oversized_candidate_forced_to_zero() {
        let matches = matches_at(&[1, 2, 3, 4, 5, 30, 31, 32, 33, 34]);
        let outcome = score_counts(10, 40, &matches, &Thresholds::default());
        assert_eq!(outcome.score, 0.0);
        assert_eq!(outcome.reason, REASON_SCATTERED);
        assert!(!outcome.accepted);
    }

    #[test]
    fn test_contiguous_oversized_candidate_scored() {
        let matches = matches_at(&[1, 2, 3, 4, 5, 6, 7, 9, 10, 11]);
        let outcome = score_counts(10, 40, &matches, &Thresholds::default());
        // 1.0 * 100 * (0.8 + 0.2 * 0.25)
        assert!((outcome.score - 85.0).abs() < 1e-9);
        assert!(outcome.accepted);
    }

    #[test]
    fn test_scattered_but_not_oversized_is_scored() {
        // 10 vs 14 is below the 1.5x trigger, so scattering is tolerated.
        let matches = matches_at(&[1, 2, 3, 4, 5, 10, 11, 12, 13, 14]);
        let outcome = score_counts(10, 14, &matches, &Thresholds::default());
        assert!(outcome.score > 0.0);
    }

    #[test]
    fn test_single_match_skips_contiguity() {
        let outcome = score_counts(1, 40, &matches_at(&[30]), &Thresholds::default());
        assert!(outcome.score > 0.0);
    }

    #[test]
    fn test_below_threshold_reason() {
        let outcome = score_counts(10, 10, &matches_at(&[1, 2, 3]), &Thresholds::default());
        assert!((outcome.score - 30.0).abs() < 1e-9);
        assert!(!outcome.accepted);
        assert_eq!(outcome.reason, "below threshold: 3/10 tracks matched (30%)");
    }

    #[test]
    fn test_min_matched_tracks_capped_by_canonical_size() {
        // A one-track canonical list can still be accepted with a floor of 2.
        let outcome = score_counts(1, 1, &matches_at(&[1]), &Thresholds::default());
        assert!(outcome.accepted);

        let thresholds = Thresholds {
            min_matched_tracks: 4,
            ..Thresholds::default()
        };
        let outcome = score_counts(3, 3, &matches_at(&[1, 2, 3]), &thresholds);
        assert!(outcome.accepted);
        let outcome = score_counts(5, 5, &matches_at(&[1, 2, 3]), &thresholds);
        assert!(!outcome.accepted);
    }
}
