//! Matching thresholds.
//!
//! All policy knobs live in one explicit value object that is passed to every
//! component. Nothing here is read from the environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Similarity floors and structural limits for one reconciliation run.
///
/// Similarities are on the 0-100 scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum per-track similarity to accept a pairing.
    pub min_track_similarity: f64,
    pub min_artist_similarity: f64,
    pub min_album_similarity: f64,
    /// Largest allowed step between consecutive matched candidate positions.
    pub max_position_gap: u32,
    /// Matched-track floor for accepting a result (capped at the canonical count).
    pub min_matched_tracks: usize,
    /// Candidate/canonical size ratio above which contiguity is enforced.
    pub size_ratio_trigger: f64,
    /// Similarity required alongside substring containment.
    pub containment_min_similarity: f64,
    /// Similarity of the leftover prefix to the artist for "<artist> - <album>" titles.
    pub artist_prefix_min_similarity: f64,
    /// Album similarity required before track-presence verification is tried.
    pub verification_min_album_similarity: f64,
    /// Artist similarity floor for verification of non-compilation artists.
    pub verification_min_artist_similarity: f64,
    /// Aggregate score a MatchResult needs to count as a good match.
    pub min_match_score: f64,
}

impl Thresholds {
    pub fn lenient() -> Self {
        Self {
            min_track_similarity: 75.0,
            min_artist_similarity: 65.0,
            min_album_similarity: 55.0,
            max_position_gap: 3,
            min_matched_tracks: 2,
            size_ratio_trigger: 1.5,
            containment_min_similarity: 50.0,
            artist_prefix_min_similarity: 75.0,
            verification_min_album_similarity: 80.0,
            verification_min_artist_similarity: 40.0,
            min_match_score: 60.0,
        }
    }

    pub fn strict() -> Self {
        Self {
            min_artist_similarity: 75.0,
            min_album_similarity: 65.0,
            ..Self::lenient()
        }
    }

    /// Load thresholds from a JSON file. Missing fields keep their lenient defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read thresholds file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse thresholds file {}", path.display()))
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::lenient()
    }
}
