//! Track-list reconciliation library - shared modules for all binaries.

pub mod align;
pub mod config;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod reconcile;
pub mod safety;
pub mod scoring;
pub mod similarity;
pub mod stats;
pub mod validate;
pub mod variants;

pub use config::Thresholds;
pub use models::{MatchResult, Track, TrackMatch, ValidationOutcome, ValidationScores};
pub use reconcile::{best_match, compare_tracks, rank_candidates, CandidateRelease, CanonicalRelease, RankedCandidate};
pub use validate::TrackVerifier;
