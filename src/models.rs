//! Core data models for track-list reconciliation.
//!
//! This module contains the record types that flow through the engine:
//! tracks on either side of a comparison, per-track pairings, the aggregate
//! match result and the artist/album validation outcome.

use serde::{Deserialize, Serialize};

// ============================================================================
// Tracks
// ============================================================================

/// One track on either side of a comparison.
///
/// `position` is the flattened sequence index across all discs (1-based in
/// practice, but only relative order and distance matter).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    /// Opaque handle attached by the caller (catalog track ID, URI, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl Track {
    pub fn new(title: impl Into<String>, position: u32) -> Self {
        Self {
            title: title.into(),
            position,
            disc_number: None,
            track_number: None,
            external_id: None,
            external_url: None,
        }
    }

    pub fn with_disc(mut self, disc_number: u32, track_number: u32) -> Self {
        self.disc_number = Some(disc_number);
        self.track_number = Some(track_number);
        self
    }

    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }
}

/// Build a track list from titles, assigning positions 1..=n in order.
pub fn tracks_from_titles<S: AsRef<str>>(titles: &[S]) -> Vec<Track> {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| Track::new(t.as_ref(), i as u32 + 1))
        .collect()
}

// ============================================================================
// Alignment Results
// ============================================================================

/// Pairing of one canonical track with one candidate track.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrackMatch {
    pub canonical_title: String,
    pub canonical_position: u32,
    pub candidate_title: String,
    pub candidate_position: u32,
    /// Index of the candidate track in the candidate list. Unique per alignment.
    pub candidate_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_external_id: Option<String>,
    /// 0-100, including any position bonus.
    pub similarity: f64,
}

/// Outcome of comparing a canonical track list against one candidate collection.
///
/// Invariant: `track_matches.len() + unmatched_canonical_tracks.len() == canonical_count`.
#[derive(Clone, Debug, Serialize)]
pub struct MatchResult {
    pub candidate_id: String,
    /// 0-100
    pub score: f64,
    /// Ordered by canonical position.
    pub track_matches: Vec<TrackMatch>,
    pub unmatched_canonical_tracks: Vec<String>,
    pub canonical_count: usize,
    pub candidate_count: usize,
    pub reason: String,
    /// Whether the score and matched count clear the acceptance floors.
    pub accepted: bool,
}

impl MatchResult {
    pub fn matched_count(&self) -> usize {
        self.track_matches.len()
    }

    /// Fraction of canonical tracks that found a partner (0.0 to 1.0).
    pub fn track_match_ratio(&self) -> f64 {
        if self.canonical_count == 0 {
            0.0
        } else {
            self.track_matches.len() as f64 / self.canonical_count as f64
        }
    }
}

// ============================================================================
// Validation Results
// ============================================================================

/// Scores recorded by the artist/album gate.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationScores {
    pub album_similarity: f64,
    /// None when the gate stopped at the album check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_similarity: Option<f64>,
    pub album_substring_match: bool,
    pub artist_substring_match: bool,
    /// Album accepted because the candidate title is "<artist> <album>".
    pub album_artist_prefixed: bool,
    /// Artist similarity after nickname and ensemble canonicalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_variant_similarity: Option<f64>,
    pub verified_by_track_presence: bool,
}

/// Result of the artist/album gate. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub reason: String,
    pub scores: ValidationScores,
}

impl ValidationOutcome {
    pub fn valid(reason: impl Into<String>, scores: ValidationScores) -> Self {
        Self {
            is_valid: true,
            reason: reason.into(),
            scores,
        }
    }

    pub fn invalid(reason: impl Into<String>, scores: ValidationScores) -> Self {
        Self {
            is_valid: false,
            reason: reason.into(),
            scores,
        }
    }
}
