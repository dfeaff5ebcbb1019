//! Greedy track-list alignment and sequence contiguity.
//!
//! Alignment is greedy in canonical order, not a global optimum: each
//! canonical track claims its best unclaimed candidate before the next one
//! is considered. Canonical lists are short and ties are rare, and the
//! canonical order decides ambiguous cases, so do not swap this for a
//! bipartite matcher without re-checking the fixtures below.

use tracing::debug;

use crate::config::Thresholds;
use crate::models::{Track, TrackMatch};
use crate::normalize::normalize;
use crate::similarity::similarity_normalized;

/// Flat bonus for position-consistent near-matches.
pub const POSITION_BONUS: f64 = 5.0;

/// Largest position difference that earns the bonus.
pub const POSITION_BONUS_MAX_DISTANCE: u32 = 2;

/// Similarity a pair needs before the bonus applies.
pub const POSITION_BONUS_MIN_SIMILARITY: f64 = 70.0;

/// Result of aligning a canonical list against a candidate list.
#[derive(Clone, Debug, Default)]
pub struct Alignment {
    /// Ordered by canonical position.
    pub matches: Vec<TrackMatch>,
    /// Canonical titles with no acceptable partner, in canonical order.
    pub unmatched: Vec<String>,
}

/// Distance between two tracks for the position bonus.
///
/// Tracks on the same disc compare track numbers, so extra tracks on earlier
/// discs of the candidate do not push the pair out of range. Otherwise the
/// flattened positions are compared.
fn position_distance(a: &Track, b: &Track) -> u32 {
    match (a.disc_number, a.track_number, b.disc_number, b.track_number) {
        (Some(disc_a), Some(num_a), Some(disc_b), Some(num_b)) if disc_a == disc_b => num_a.abs_diff(num_b),
        _ => a.position.abs_diff(b.position),
    }
}

/// Similarity with the position bonus applied, capped at 100.
fn positioned_score(similarity: f64, distance: u32) -> f64 {
    if similarity >= POSITION_BONUS_MIN_SIMILARITY && distance <= POSITION_BONUS_MAX_DISTANCE {
        (similarity + POSITION_BONUS).min(100.0)
    } else {
        similarity
    }
}

/// Pair each canonical track with at most one candidate track.
///
/// No candidate track is claimed twice. Ties go to the earliest candidate
/// in list order.
pub fn align(canonical: &[Track], candidate: &[Track], thresholds: &Thresholds) -> Alignment {
    let canonical_norm: Vec<String> = canonical.iter().map(|t| normalize(&t.title)).collect();
    let candidate_norm: Vec<String> = candidate.iter().map(|t| normalize(&t.title)).collect();
    let mut claimed = vec![false; candidate.len()];

    let mut matches = Vec::new();
    let mut unmatched = Vec::new();

    for (track, title_norm) in canonical.iter().zip(&canonical_norm) {
        let mut best: Option<(usize, f64)> = None;

        for (idx, (cand, cand_norm)) in candidate.iter().zip(&candidate_norm).enumerate() {
            if claimed[idx] {
                continue;
            }
            let base = similarity_normalized(title_norm, cand_norm);
            let score = positioned_score(base, position_distance(track, cand));
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, score)) if score >= thresholds.min_track_similarity => {
                claimed[idx] = true;
                let cand = &candidate[idx];
                matches.push(TrackMatch {
                    canonical_title: track.title.clone(),
                    canonical_position: track.position,
                    candidate_title: cand.title.clone(),
                    candidate_position: cand.position,
                    candidate_index: idx,
                    candidate_external_id: cand.external_id.clone(),
                    similarity: score,
                });
            }
            _ => unmatched.push(track.title.clone()),
        }
    }

    matches.sort_by_key(|m| m.canonical_position);

    debug!(
        canonical = canonical.len(),
        candidate = candidate.len(),
        matched = matches.len(),
        unmatched = ?unmatched,
        "Track alignment complete"
    );

    Alignment { matches, unmatched }
}

/// Whether matched candidate positions form a near-consecutive run.
///
/// Matches are taken in canonical-position order; each candidate position
/// must strictly increase on the previous one by at most `max_gap`. Fewer
/// than two matches are trivially contiguous.
pub fn is_contiguous(matches: &[TrackMatch], max_gap: u32) -> bool {
    if matches.len() < 2 {
        return true;
    }
    let mut ordered: Vec<&TrackMatch> = matches.iter().collect();
    ordered.sort_by_key(|m| m.canonical_position);

    ordered.windows(2).all(|pair| {
        let (prev, next) = (pair[0].candidate_position, pair[1].candidate_position);
        next > prev && next - prev <= max_gap
    })
}
