//! Artist/album validation gate.
//!
//! Decides whether a candidate release is plausibly the expected one before
//! any track alignment happens. Decision order:
//!
//! 1. Album: fuzzy similarity, or article-stripped substring containment with
//!    a similarity floor, or an "<artist> - <album>" candidate title.
//! 2. Artist: best of per-artist and joined-credit similarity, or substring
//!    containment with a similarity floor, or nickname/ensemble
//!    canonicalization.
//! 3. Artist rejected but album strong: track-presence verification. This is
//!    unconditional for compilation credits and requires a minimum artist
//!    similarity otherwise.

use tracing::{debug, warn};

use crate::config::Thresholds;
use crate::models::{Track, ValidationOutcome, ValidationScores};
use crate::normalize::{normalize, strip_leading_article};
use crate::similarity::{mutual_contains, similarity, similarity_normalized};
use crate::variants::{canonical_artist, is_compilation_artist};

/// Separators dropped from the leftover part of an artist-prefixed album title.
const PREFIX_SEPARATORS: [char; 6] = ['(', ')', '-', '\u{2013}', '\u{2014}', ':'];

/// Checks whether a candidate collection contains a given song.
///
/// Implementations may do network I/O. An `Err` counts as "not found".
pub trait TrackVerifier: Sync {
    fn has_track(&self, candidate_id: &str, song_title: &str) -> anyhow::Result<bool>;
}

impl<F> TrackVerifier for F
where
    F: Fn(&str, &str) -> anyhow::Result<bool> + Sync,
{
    fn has_track(&self, candidate_id: &str, song_title: &str) -> anyhow::Result<bool> {
        self(candidate_id, song_title)
    }
}

/// The candidate side of a validation.
#[derive(Clone, Copy, Debug)]
pub struct CandidateInfo<'a> {
    pub id: &'a str,
    pub album_title: &'a str,
    pub artists: &'a [String],
}

/// The expected side of a validation.
#[derive(Clone, Copy, Debug)]
pub struct ExpectedInfo<'a> {
    pub album_title: &'a str,
    pub artist: &'a str,
    /// Song used for track-presence verification.
    pub song_title: Option<&'a str>,
}

/// Whether any track title is similar enough to `song_title`.
pub fn tracks_contain_title(tracks: &[Track], song_title: &str, thresholds: &Thresholds) -> bool {
    let song_norm = normalize(song_title);
    tracks
        .iter()
        .any(|t| similarity_normalized(&normalize(&t.title), &song_norm) >= thresholds.min_track_similarity)
}

/// Candidate title is the expected album with the artist name attached,
/// e.g. "The Dave Brubeck Quartet: Time Out" for "Time Out".
pub fn is_artist_prefixed_album(
    candidate_album: &str,
    expected_album: &str,
    expected_artist: &str,
    thresholds: &Thresholds,
) -> bool {
    let candidate_lower = candidate_album.to_lowercase();
    let expected_lower = expected_album.trim().to_lowercase();
    if expected_lower.is_empty() {
        return false;
    }
    let Some(idx) = candidate_lower.find(&expected_lower) else {
        return false;
    };
    let leftover = format!(
        "{} {}",
        &candidate_lower[..idx],
        &candidate_lower[idx + expected_lower.len()..]
    );
    let remainder: String = leftover
        .chars()
        .map(|c| if PREFIX_SEPARATORS.contains(&c) { ' ' } else { c })
        .collect();
    let remainder = remainder.trim();
    !remainder.is_empty() && similarity(remainder, expected_artist) >= thresholds.artist_prefix_min_similarity
}

fn best_artist_similarity(candidate_artists: &[String], expected_norm: &str, prepare: impl Fn(&str) -> String) -> f64 {
    let individual = candidate_artists
        .iter()
        .map(|a| similarity_normalized(&prepare(a), expected_norm))
        .fold(0.0, f64::max);
    let joined = similarity_normalized(&prepare(&candidate_artists.join(", ")), expected_norm);
    individual.max(joined)
}

/// Run the artist/album gate for one candidate release.
pub fn validate(
    candidate: &CandidateInfo<'_>,
    expected: &ExpectedInfo<'_>,
    verifier: Option<&dyn TrackVerifier>,
    thresholds: &Thresholds,
) -> ValidationOutcome {
    let mut scores = ValidationScores::default();

    // ═══════════════════════════════════════════════════════════════════════
    // STEP 1: Album
    // ═══════════════════════════════════════════════════════════════════════
    let candidate_album = normalize(candidate.album_title);
    let expected_album = normalize(expected.album_title);
    let album_similarity = similarity_normalized(&candidate_album, &expected_album);
    let album_substring = mutual_contains(
        strip_leading_article(&candidate_album),
        strip_leading_article(&expected_album),
    );
    scores.album_similarity = album_similarity;
    scores.album_substring_match = album_substring;

    let mut album_ok = album_similarity >= thresholds.min_album_similarity
        || (album_substring && album_similarity >= thresholds.containment_min_similarity);

    if !album_ok
        && is_artist_prefixed_album(candidate.album_title, expected.album_title, expected.artist, thresholds)
    {
        scores.album_artist_prefixed = true;
        album_ok = true;
    }

    if !album_ok {
        debug!(
            candidate = candidate.id,
            album_similarity,
            "Album rejected: {:?} vs {:?}",
            candidate.album_title,
            expected.album_title
        );
        return ValidationOutcome::invalid(
            format!(
                "album mismatch: similarity {:.0}% below {:.0}%",
                album_similarity, thresholds.min_album_similarity
            ),
            scores,
        );
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STEP 2: Artist
    // ═══════════════════════════════════════════════════════════════════════
    let expected_artist = normalize(expected.artist);
    let artist_similarity = best_artist_similarity(candidate.artists, &expected_artist, normalize);
    let joined_artist = normalize(&candidate.artists.join(", "));
    let artist_substring = candidate
        .artists
        .iter()
        .map(|a| normalize(a))
        .chain(std::iter::once(joined_artist))
        .any(|a| mutual_contains(&a, &expected_artist));
    scores.artist_similarity = Some(artist_similarity);
    scores.artist_substring_match = artist_substring;

    if artist_similarity >= thresholds.min_artist_similarity
        || (artist_substring && artist_similarity >= thresholds.containment_min_similarity)
    {
        debug!(candidate = candidate.id, album_similarity, artist_similarity, "Release accepted");
        return ValidationOutcome::valid("album and artist match", scores);
    }

    let expected_canonical = normalize(&canonical_artist(expected.artist));
    let variant_similarity =
        best_artist_similarity(candidate.artists, &expected_canonical, |a| normalize(&canonical_artist(a)));
    scores.name_variant_similarity = Some(variant_similarity);

    if variant_similarity >= thresholds.min_artist_similarity {
        debug!(candidate = candidate.id, variant_similarity, "Release accepted via name variants");
        return ValidationOutcome::valid("artist matched after name-variant canonicalization", scores);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STEP 3: Track-presence verification
    // ═══════════════════════════════════════════════════════════════════════
    let best_artist = artist_similarity.max(variant_similarity);

    if album_similarity >= thresholds.verification_min_album_similarity {
        if let (Some(song), Some(verifier)) = (expected.song_title, verifier) {
            let compilation = is_compilation_artist(expected.artist);
            if compilation || best_artist >= thresholds.verification_min_artist_similarity {
                let found = match verifier.has_track(candidate.id, song) {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(candidate = candidate.id, song, "Track verification failed: {e:#}");
                        false
                    }
                };
                debug!(candidate = candidate.id, compilation, found, "Track-presence verification");
                if found {
                    scores.verified_by_track_presence = true;
                    let reason = if compilation {
                        format!("compilation artist, track {:?} present in candidate", song)
                    } else {
                        format!(
                            "artist similarity {:.0}% below threshold, track {:?} present in candidate",
                            best_artist, song
                        )
                    };
                    return ValidationOutcome::valid(reason, scores);
                }
                return ValidationOutcome::invalid(
                    format!(
                        "artist mismatch: similarity {:.0}% and track {:?} not found in candidate",
                        best_artist, song
                    ),
                    scores,
                );
            }
        }
    }

    debug!(candidate = candidate.id, artist_similarity, "Artist rejected");
    ValidationOutcome::invalid(
        format!(
            "artist mismatch: similarity {:.0}% below {:.0}%",
            best_artist, thresholds.min_artist_similarity
        ),
        scores,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tracks_from_titles;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn artists(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn expected<'a>(album: &'a str, artist: &'a str, song: Option<&'a str>) -> ExpectedInfo<'a> {
        ExpectedInfo {
            album_title: album,
            artist,
            song_title: song,
        }
    }

    #[test]
    fn test_exact_release_valid() {
        let credits = artists(&["Miles Davis"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Kind of Blue (Legacy Edition)",
            artists: &credits,
        };
        let outcome = validate(&candidate, &expected("Kind of Blue", "Miles Davis", None), None, &Thresholds::default());
        assert!(outcome.is_valid);
        assert_eq!(outcome.scores.album_similarity, 100.0);
        assert_eq!(outcome.scores.artist_similarity, Some(100.0));
        assert!(!outcome.scores.verified_by_track_presence);
    }

    #[test]
    fn test_album_rejected_stops_early() {
        let credits = artists(&["Miles Davis"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Giant Steps",
            artists: &credits,
        };
        let outcome = validate(&candidate, &expected("Kind of Blue", "Miles Davis", None), None, &Thresholds::default());
        assert!(!outcome.is_valid);
        assert!(outcome.reason.starts_with("album mismatch"));
        assert_eq!(outcome.scores.artist_similarity, None);
    }

    #[test]
    fn test_album_substring_containment() {
        let credits = artists(&["Miles Davis"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Kind of Blue: The Complete Sessions",
            artists: &credits,
        };
        let outcome = validate(&candidate, &expected("Kind of Blue", "Miles Davis", None), None, &Thresholds::default());
        assert!(outcome.scores.album_substring_match);
        assert!(outcome.scores.album_similarity < 55.0);
        assert!(outcome.scores.album_similarity >= 50.0);
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_artist_prefixed_album_title() {
        let credits = artists(&["The Dave Brubeck Quartet"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "The Dave Brubeck Quartet: Time Out",
            artists: &credits,
        };
        let outcome = validate(
            &candidate,
            &expected("Time Out", "Dave Brubeck Quartet", None),
            None,
            &Thresholds::default(),
        );
        assert!(outcome.scores.album_similarity < 50.0);
        assert!(outcome.scores.album_artist_prefixed);
        assert!(outcome.is_valid);
    }

    #[test]
    fn test_is_artist_prefixed_album() {
        let t = Thresholds::default();
        assert!(is_artist_prefixed_album("Miles Davis - Kind of Blue", "Kind of Blue", "Miles Davis", &t));
        assert!(!is_artist_prefixed_album("Kind of Blue", "Kind of Blue", "Miles Davis", &t));
        assert!(!is_artist_prefixed_album("Greatest Hits - Kind of Blue", "Kind of Blue", "Miles Davis", &t));
        assert!(!is_artist_prefixed_album("Giant Steps", "Kind of Blue", "Miles Davis", &t));
    }

    #[test]
    fn test_artist_joined_credit() {
        let credits = artists(&["Dizzy Gillespie", "Charlie Parker"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Bird and Diz",
            artists: &credits,
        };
        let outcome = validate(
            &candidate,
            &expected("Bird and Diz", "Charlie Parker", None),
            None,
            &Thresholds::default(),
        );
        assert!(outcome.is_valid);
        assert_eq!(outcome.scores.artist_similarity, Some(100.0));
    }

    #[test]
    fn test_name_variant_rescue() {
        let credits = artists(&["Robert Brookmeyer"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Traditionalism Revisited",
            artists: &credits,
        };
        let outcome = validate(
            &candidate,
            &expected("Traditionalism Revisited", "Bob Brookmeyer", None),
            None,
            &Thresholds::strict(),
        );
        assert!(outcome.is_valid);
        assert!(outcome.scores.artist_similarity.unwrap() < 75.0);
        assert_eq!(outcome.scores.name_variant_similarity, Some(100.0));
    }

    #[test]
    fn test_compilation_artist_verified_by_track_presence() {
        let credits = artists(&["Zoot Sims"]);
        let candidate = CandidateInfo {
            id: "jatp",
            album_title: "Jazz at the Philharmonic 1946",
            artists: &credits,
        };
        let calls = AtomicUsize::new(0);
        let verifier = |id: &str, song: &str| -> anyhow::Result<bool> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(id == "jatp" && song == "How High the Moon")
        };
        let outcome = validate(
            &candidate,
            &expected("Jazz at the Philharmonic 1946", "Various Artists", Some("How High the Moon")),
            Some(&verifier),
            &Thresholds::default(),
        );
        assert!(outcome.scores.album_similarity >= 80.0);
        assert!(outcome.scores.artist_similarity.unwrap() < 40.0);
        assert!(outcome.is_valid);
        assert!(outcome.scores.verified_by_track_presence);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_non_compilation_artist_below_floor_never_verified() {
        let credits = artists(&["Zoot Sims"]);
        let candidate = CandidateInfo {
            id: "jatp",
            album_title: "Jazz at the Philharmonic 1946",
            artists: &credits,
        };
        let calls = AtomicUsize::new(0);
        let verifier = |_: &str, _: &str| -> anyhow::Result<bool> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        };
        let outcome = validate(
            &candidate,
            &expected("Jazz at the Philharmonic 1946", "Illinois Jacquet", Some("How High the Moon")),
            Some(&verifier),
            &Thresholds::default(),
        );
        assert!(outcome.scores.artist_similarity.unwrap() < 40.0);
        assert!(!outcome.is_valid);
        assert!(!outcome.scores.verified_by_track_presence);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_artist_above_floor_verified_by_track_presence() {
        let credits = artists(&["Lester Bowie"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Jazz Giants",
            artists: &credits,
        };
        let calls = AtomicUsize::new(0);
        let verifier = |_: &str, song: &str| -> anyhow::Result<bool> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(song == "Lady Be Good")
        };
        let outcome = validate(
            &candidate,
            &expected("Jazz Giants", "Lester Young", Some("Lady Be Good")),
            Some(&verifier),
            &Thresholds::default(),
        );
        let artist = outcome.scores.artist_similarity.unwrap();
        assert!(artist >= 40.0 && artist < 65.0);
        assert!(!outcome.scores.artist_substring_match);
        assert!(outcome.is_valid);
        assert!(outcome.scores.verified_by_track_presence);
        assert!(outcome.reason.starts_with("artist similarity"));
        assert!(outcome.reason.contains("below threshold"));
        assert!(outcome.reason.contains("present in candidate"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_weak_album_skips_verification_for_compilations() {
        let credits = artists(&["Zoot Sims"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Kind of Blue: The Complete Sessions",
            artists: &credits,
        };
        let calls = AtomicUsize::new(0);
        let verifier = |_: &str, _: &str| -> anyhow::Result<bool> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        };
        let outcome = validate(
            &candidate,
            &expected("Kind of Blue", "Various Artists", Some("So What")),
            Some(&verifier),
            &Thresholds::default(),
        );
        // Album passes on containment but stays under the verification floor.
        assert!(outcome.scores.album_similarity < 80.0);
        assert!(outcome.scores.artist_similarity.is_some());
        assert!(!outcome.is_valid);
        assert!(!outcome.scores.verified_by_track_presence);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_artist_substring_containment() {
        let credits = artists(&["Coleman Hawkins & Illinois Jacquet"]);
        let candidate = CandidateInfo {
            id: "c1",
            album_title: "Jazz Giants",
            artists: &credits,
        };
        let outcome = validate(
            &candidate,
            &expected("Jazz Giants", "Coleman Hawkins", None),
            None,
            &Thresholds::default(),
        );
        let artist = outcome.scores.artist_similarity.unwrap();
        assert!(artist >= 50.0 && artist < 65.0);
        assert!(outcome.scores.artist_substring_match);
        assert!(outcome.is_valid);
        assert_eq!(outcome.scores.name_variant_similarity, None);
    }

    #[test]
    fn test_verifier_error_counts_as_not_found() {
        let credits = artists(&["Zoot Sims"]);
        let candidate = CandidateInfo {
            id: "jatp",
            album_title: "Jazz at the Philharmonic 1946",
            artists: &credits,
        };
        let verifier = |_: &str, _: &str| -> anyhow::Result<bool> { anyhow::bail!("timeout") };
        let outcome = validate(
            &candidate,
            &expected("Jazz at the Philharmonic 1946", "Various Artists", Some("How High the Moon")),
            Some(&verifier),
            &Thresholds::default(),
        );
        assert!(!outcome.is_valid);
        assert!(outcome.reason.contains("not found"));
    }

    #[test]
    fn test_no_verification_without_song() {
        let credits = artists(&["Zoot Sims"]);
        let candidate = CandidateInfo {
            id: "jatp",
            album_title: "Jazz at the Philharmonic 1946",
            artists: &credits,
        };
        let verifier = |_: &str, _: &str| -> anyhow::Result<bool> { Ok(true) };
        let outcome = validate(
            &candidate,
            &expected("Jazz at the Philharmonic 1946", "Various Artists", None),
            Some(&verifier),
            &Thresholds::default(),
        );
        assert!(!outcome.is_valid);
        assert!(outcome.reason.starts_with("artist mismatch"));
    }

    #[test]
    fn test_tracks_contain_title() {
        let tracks = tracks_from_titles(&["Perdido", "How High the Moon (Live)", "JATP Blues"]);
        let t = Thresholds::default();
        assert!(tracks_contain_title(&tracks, "How High the Moon", &t));
        assert!(!tracks_contain_title(&tracks, "Body and Soul", &t));
    }
}
