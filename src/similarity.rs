//! Token-order-insensitive similarity on the 0-100 scale.
//!
//! The base ratio is the normalized Indel similarity (insertions and
//! deletions only): `2 * LCS / (len_a + len_b)`. Tokens are sorted before
//! comparison so "Davis Miles" and "Miles Davis" score 100.

use crate::normalize::{normalize, strip_parentheticals};

/// Below this, retry the comparison with parenthetical content removed.
pub const PARENTHETICAL_RETRY_BELOW: f64 = 80.0;

/// Normalized Indel similarity of two strings (0.0 to 100.0).
/// Two empty strings are identical and score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * rapidfuzz::fuzz::ratio(a.chars(), b.chars())
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `ratio` after sorting the whitespace-delimited tokens of each side.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Similarity of two strings that are already in `normalize` form.
///
/// Callers comparing many pairs normalize once up front and use this.
pub fn similarity_normalized(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let score = token_sort_ratio(a, b);
    if score >= PARENTHETICAL_RETRY_BELOW {
        return score;
    }
    let a_bare = strip_parentheticals(a);
    let b_bare = strip_parentheticals(b);
    if a_bare.is_empty() || b_bare.is_empty() {
        return score;
    }
    score.max(token_sort_ratio(&a_bare, &b_bare))
}

/// Similarity of two raw strings (0.0 to 100.0). Symmetric; empty input scores 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_normalized(&normalize(a), &normalize(b))
}

/// Either string fully contains the other. Empty strings never match.
pub fn mutual_contains(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_basics() {
        assert_eq!(ratio("abc", "abc"), 100.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 100.0);
        // LCS("abcd", "abed") = 3 → 2*3/8
        assert!((ratio("abcd", "abed") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_token_sort_ignores_order() {
        assert_eq!(token_sort_ratio("miles davis", "davis miles"), 100.0);
        assert_eq!(token_sort_ratio("a  b", "b a"), 100.0);
    }

    #[test]
    fn test_similarity_identity() {
        for s in ["so what", "Autumn Leaves", "'Round Midnight", "x"] {
            assert_eq!(similarity(s, s), 100.0, "identity failed for {:?}", s);
        }
    }

    #[test]
    fn test_similarity_symmetric() {
        let pairs = [
            ("Who Cares?", "Who Cares (As Long As You Care For Me)"),
            ("Blue in Green", "Green Dolphin Street"),
            ("Miles Davis Quintet", "The Miles Davis"),
            ("Autumn Leaves", ""),
            ("So What", "So What - Live"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a), "asymmetric for {:?} / {:?}", a, b);
        }
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(similarity("", "So What"), 0.0);
        assert_eq!(similarity("So What", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
        // Normalizes to empty
        assert_eq!(similarity("\"\"", "So What"), 0.0);
    }

    #[test]
    fn test_apostrophe_handling() {
        assert!(similarity("Don'cha", "Don Cha") >= 95.0);
        assert!(similarity("Don\u{2019}cha Go", "Don Cha Go") >= 95.0);
    }

    #[test]
    fn test_parenthetical_retry() {
        let direct = token_sort_ratio(&normalize("Who Cares?"), &normalize("Who Cares (As Long As You Care For Me)"));
        assert!(direct < PARENTHETICAL_RETRY_BELOW);
        assert_eq!(similarity("Who Cares?", "Who Cares (As Long As You Care For Me)"), 100.0);
    }

    #[test]
    fn test_annotations_do_not_hurt() {
        assert_eq!(similarity("Autumn Leaves", "Autumn Leaves (Remastered 2020)"), 100.0);
        assert_eq!(similarity("'Round Midnight", "Round Midnight"), 100.0);
        assert!(similarity("So What", "Blue in Green") < 50.0);
    }

    #[test]
    fn test_mutual_contains() {
        assert!(mutual_contains("kind of blue", "kind of blue legacy edition"));
        assert!(mutual_contains("kind of blue legacy edition", "kind of blue"));
        assert!(!mutual_contains("", "kind of blue"));
        assert!(!mutual_contains("giant steps", "kind of blue"));
    }
}
