//! Run statistics for batch reconciliation.

use serde::Serialize;

use crate::reconcile::JobReport;
use crate::scoring::REASON_SCATTERED;

/// Per-run counters, logged as JSON at the end of each phase.
#[derive(Default, Debug, Clone, Serialize)]
pub struct ReconcileStats {
    // Gate
    pub jobs: usize,
    pub candidates_considered: usize,
    pub album_rejections: usize,
    pub artist_rejections: usize,
    pub verified_by_track_presence: usize,
    pub name_variant_rescues: usize,

    // Scoring
    pub candidates_scored: usize,
    pub scattered_rejections: usize,
    pub below_threshold: usize,

    // Final totals
    pub accepted_jobs: usize,
    pub unmatched_jobs: usize,

    // Timing
    pub elapsed_seconds: f64,
}

impl ReconcileStats {
    /// Percentage of jobs with an accepted candidate
    pub fn match_rate(&self) -> f64 {
        if self.jobs == 0 {
            0.0
        } else {
            100.0 * self.accepted_jobs as f64 / self.jobs as f64
        }
    }

    /// Fold one job's report into the counters.
    pub fn record(&mut self, report: &JobReport) {
        self.jobs += 1;
        if report.is_matched() {
            self.accepted_jobs += 1;
        } else {
            self.unmatched_jobs += 1;
        }

        for ranked in &report.candidates {
            self.candidates_considered += 1;
            let scores = &ranked.validation.scores;
            if !ranked.validation.is_valid {
                if scores.artist_similarity.is_none() {
                    self.album_rejections += 1;
                } else {
                    self.artist_rejections += 1;
                }
                continue;
            }
            if scores.verified_by_track_presence {
                self.verified_by_track_presence += 1;
            } else if scores.name_variant_similarity.is_some() {
                self.name_variant_rescues += 1;
            }

            if let Some(result) = &ranked.match_result {
                self.candidates_scored += 1;
                if result.reason == REASON_SCATTERED {
                    self.scattered_rejections += 1;
                } else if !result.accepted {
                    self.below_threshold += 1;
                }
            }
        }
    }

    /// Log stats to stderr in JSON format
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string_pretty(self) {
            eprintln!("[STATS:{}]\n{}", phase, json);
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
