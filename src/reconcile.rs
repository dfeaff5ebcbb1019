//! Candidate ranking: the validation gate, track alignment and scoring wired
//! together for one canonical release against many candidate releases.

use anyhow::{Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::align::align;
use crate::config::Thresholds;
use crate::models::{MatchResult, Track, ValidationOutcome};
use crate::normalize::normalize_for_search;
use crate::scoring::score;
use crate::validate::{tracks_contain_title, validate, CandidateInfo, ExpectedInfo, TrackVerifier};

// ============================================================================
// Releases
// ============================================================================

/// The authoritative side of a comparison.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CanonicalRelease {
    pub artist: String,
    pub album: String,
    /// Song used for track-presence verification when the artist check fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_title: Option<String>,
    pub tracks: Vec<Track>,
}

impl CanonicalRelease {
    /// `"<artist> <album>"` in search form, for catalog lookups.
    pub fn search_query(&self) -> String {
        normalize_for_search(&format!("{} {}", self.artist, self.album))
    }
}

/// One collection from the other catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateRelease {
    pub id: String,
    pub album_title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    pub tracks: Vec<Track>,
}

/// Validation outcome for one candidate, plus its match result when the
/// gate passed.
#[derive(Clone, Debug, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: String,
    pub validation: ValidationOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_result: Option<MatchResult>,
}

impl RankedCandidate {
    /// Match score, 0 for candidates rejected by the gate.
    pub fn score(&self) -> f64 {
        self.match_result.as_ref().map_or(0.0, |m| m.score)
    }

    pub fn is_accepted(&self) -> bool {
        self.validation.is_valid && self.match_result.as_ref().is_some_and(|m| m.accepted)
    }

    pub fn reason(&self) -> &str {
        match &self.match_result {
            Some(m) => &m.reason,
            None => &self.validation.reason,
        }
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Align `canonical` against one candidate's tracks and score the result.
pub fn compare_tracks(canonical: &[Track], candidate: &CandidateRelease, thresholds: &Thresholds) -> MatchResult {
    let alignment = align(canonical, &candidate.tracks, thresholds);
    let outcome = score(canonical, &candidate.tracks, &alignment.matches, thresholds);

    MatchResult {
        candidate_id: candidate.id.clone(),
        score: outcome.score,
        track_matches: alignment.matches,
        unmatched_canonical_tracks: alignment.unmatched,
        canonical_count: canonical.len(),
        candidate_count: candidate.tracks.len(),
        reason: outcome.reason,
        accepted: outcome.accepted,
    }
}

fn evaluate(
    canonical: &CanonicalRelease,
    candidate: &CandidateRelease,
    verifier: Option<&dyn TrackVerifier>,
    thresholds: &Thresholds,
) -> RankedCandidate {
    let info = CandidateInfo {
        id: &candidate.id,
        album_title: &candidate.album_title,
        artists: &candidate.artists,
    };
    let expected = ExpectedInfo {
        album_title: &canonical.album,
        artist: &canonical.artist,
        song_title: canonical.song_title.as_deref(),
    };
    let validation = validate(&info, &expected, verifier, thresholds);

    let match_result = validation
        .is_valid
        .then(|| compare_tracks(&canonical.tracks, candidate, thresholds));

    RankedCandidate {
        candidate_id: candidate.id.clone(),
        validation,
        match_result,
    }
}

/// Gate, align and score every candidate, best first.
///
/// Candidates are independent and evaluated in parallel. Equal scores keep
/// their input order.
pub fn rank_candidates(
    canonical: &CanonicalRelease,
    candidates: &[CandidateRelease],
    verifier: Option<&dyn TrackVerifier>,
    thresholds: &Thresholds,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .par_iter()
        .map(|candidate| evaluate(canonical, candidate, verifier, thresholds))
        .collect();

    ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));

    debug!(
        album = canonical.album.as_str(),
        candidates = ranked.len(),
        valid = ranked.iter().filter(|r| r.validation.is_valid).count(),
        "Ranked candidates"
    );
    ranked
}

/// Highest-ranked accepted candidate, if any.
pub fn best_match(
    canonical: &CanonicalRelease,
    candidates: &[CandidateRelease],
    verifier: Option<&dyn TrackVerifier>,
    thresholds: &Thresholds,
) -> Option<RankedCandidate> {
    rank_candidates(canonical, candidates, verifier, thresholds)
        .into_iter()
        .find(RankedCandidate::is_accepted)
}

// ============================================================================
// In-memory verification
// ============================================================================

/// Track-presence verifier over already-fetched candidate track lists.
pub struct InMemoryCatalog {
    tracks: FxHashMap<String, Vec<Track>>,
    thresholds: Thresholds,
}

impl InMemoryCatalog {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            tracks: FxHashMap::default(),
            thresholds,
        }
    }

    pub fn from_candidates(candidates: &[CandidateRelease], thresholds: Thresholds) -> Self {
        let mut catalog = Self::new(thresholds);
        for c in candidates {
            catalog.insert(c.id.clone(), c.tracks.clone());
        }
        catalog
    }

    pub fn insert(&mut self, candidate_id: String, tracks: Vec<Track>) {
        self.tracks.insert(candidate_id, tracks);
    }
}

impl TrackVerifier for InMemoryCatalog {
    fn has_track(&self, candidate_id: &str, song_title: &str) -> Result<bool> {
        let tracks = self
            .tracks
            .get(candidate_id)
            .with_context(|| format!("Unknown candidate '{}'", candidate_id))?;
        Ok(tracks_contain_title(tracks, song_title, &self.thresholds))
    }
}

// ============================================================================
// Jobs and reports
// ============================================================================

/// One canonical release and the candidates fetched for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileJob {
    pub canonical: CanonicalRelease,
    pub candidates: Vec<CandidateRelease>,
}

#[derive(Clone, Debug, Serialize)]
pub struct JobReport {
    pub artist: String,
    pub album: String,
    pub search_query: String,
    pub best_candidate_id: Option<String>,
    pub best_score: Option<f64>,
    pub reason: String,
    pub candidates: Vec<RankedCandidate>,
}

impl JobReport {
    pub fn is_matched(&self) -> bool {
        self.best_candidate_id.is_some()
    }
}

pub fn load_jobs(path: &Path) -> Result<Vec<ReconcileJob>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read jobs file {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse jobs file {}", path.display()))
}

pub fn write_reports(path: &Path, reports: &[JobReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write report {}", path.display()))?;
    Ok(())
}

/// Rank one job's candidates, verifying track presence against the
/// candidates' own track lists.
pub fn run_job(job: &ReconcileJob, thresholds: &Thresholds) -> JobReport {
    let catalog = InMemoryCatalog::from_candidates(&job.candidates, thresholds.clone());
    let ranked = rank_candidates(&job.canonical, &job.candidates, Some(&catalog), thresholds);

    let best = ranked.iter().find(|r| r.is_accepted());
    let reason = match (best, ranked.first()) {
        (Some(b), _) => b.reason().to_string(),
        (None, Some(top)) => top.reason().to_string(),
        (None, None) => "no candidates".to_string(),
    };

    JobReport {
        artist: job.canonical.artist.clone(),
        album: job.canonical.album.clone(),
        search_query: job.canonical.search_query(),
        best_candidate_id: best.map(|b| b.candidate_id.clone()),
        best_score: best.map(RankedCandidate::score),
        reason,
        candidates: ranked,
    }
}
