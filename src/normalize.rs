//! Text normalization for catalog matching.
//!
//! `normalize` is the destructive canonical form used for every similarity
//! comparison. `normalize_for_search` is a light form for building external
//! search queries and only unifies dash and quote characters.
//!
//! CRITICAL: Track, album and artist scores all go through `normalize`.
//! Any change here shifts every threshold. Run tests after changes.

use any_ascii::any_ascii;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// CHARACTER CLASSES
// ============================================================================

/// En-dash, em-dash, minus sign, figure dash, horizontal bar.
const DASH_CHARS: [char; 6] = ['\u{2010}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}'];

/// Apostrophe-like characters. Replaced by a space so "Don'cha" == "Don Cha".
const APOSTROPHE_CHARS: [char; 6] = ['\'', '\u{2018}', '\u{2019}', '\u{201B}', '`', '\u{00B4}'];

const DOUBLE_QUOTE_CHARS: [char; 4] = ['"', '\u{201C}', '\u{201D}', '\u{201E}'];

const MONTHS: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?";

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Live-recording annotations: "- Live at X", "(Live in Y)", "- Live", "(Live)", ": Live",
/// "(Live - 1959)", ", Live at Birdland"
pub static LIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\s*[\(\[]live(?:\s+(?:at|in|from|on)\b[^)\]]*|\s+\d{4}|\s*[-,]\s*[^)\]]*)?[\)\]]").unwrap(),
        Regex::new(r"\s*[-:,]\s*live(?:\s+(?:at|in|from|on)\b.*|\s+\d{4})?\s*$").unwrap(),
    ]
});

/// "recorded at/in ..." suffixes, bracketed or bare.
pub static RECORDED_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\s*[\(\[][^)\]]*\brecorded\s+(?:live\s+)?(?:at|in|on)\b[^)\]]*[\)\]]").unwrap(),
        Regex::new(r"\s*[-,]?\s*\brecorded\s+(?:live\s+)?(?:at|in|on)\b.*$").unwrap(),
    ]
});

/// Remaster variants: "- Remastered 2025", "(2025 Remaster)", "- Instrumental/Remastered",
/// "/ 1997 Remastered", "- 2001 Digital Remaster"
pub static REMASTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\s*[\(\[][^)\]]*\bremaster(?:ed)?\b[^)\]]*[\)\]]").unwrap(),
        Regex::new(r"\s*-\s*[^-()\[\]]*\bremaster(?:ed)?\b[^-()\[\]]*$").unwrap(),
        Regex::new(r"\s*/\s*(?:\d{4}\s+)?(?:digital\s+)?remaster(?:ed)?(?:\s+\d{4})?").unwrap(),
        Regex::new(r"\s+(?:\d{4}\s+)?remaster(?:ed)?(?:\s+\d{4})?\s*$").unwrap(),
    ]
});

/// Featured artists: "(feat. X)", "[ft. Y]", "(with Z)", "- featuring X", "Song feat. X"
pub static FEATURE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"\s*[\(\[](?:feat\.?|featuring|ft\.?|with)\s+[^)\]]*[\)\]]").unwrap(),
        Regex::new(r"\s*-\s*(?:feat\.?|featuring|ft\.?|with)\s+.*$").unwrap(),
        Regex::new(r"\s+(?:feat\.?|ft\.?|featuring)\s+.*$").unwrap(),
    ]
});

/// Source annotations: "(From the Film X)", "- from the musical Y", "(from the Z Soundtrack)"
pub static SOURCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let kinds = r"(?:film|movie|motion\s+picture|musical|show|soundtrack|broadway\s+production|production|revue)";
    vec![
        Regex::new(&format!(r"\s*[\(\[]\s*from\s+(?:the\s+)?[^)\]]*\b{kinds}\b[^)\]]*[\)\]]")).unwrap(),
        Regex::new(&format!(r"\s*-\s*from\s+(?:the\s+)?.*\b{kinds}\b.*$")).unwrap(),
    ]
});

/// Trailing venue and date fragments: "- Carnegie Hall", ", Newport Jazz Festival",
/// "- 1959-03-02", "(March 2, 1959)", ", 1957"
pub static VENUE_DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let date = format!(
        r"(?:\d{{4}}-\d{{1,2}}-\d{{1,2}}|\d{{1,2}}[/.]\d{{1,2}}[/.]\d{{2,4}}|{MONTHS}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}|{MONTHS}\s+\d{{4}}|\d{{4}})"
    );
    vec![
        Regex::new(&format!(r"\s*[\(\[]{date}[\)\]]\s*$")).unwrap(),
        Regex::new(&format!(r"\s*[-,]\s*{date}\s*$")).unwrap(),
        Regex::new(
            r"\s*[-,]\s*(?:at\s+)?[a-z0-9 .&]*\b(?:club|hall|theatre|theater|festival|cafe|lounge|ballroom|auditorium|vanguard|casino|stadium|arena|center|centre)\b[a-z0-9 .,&]*$",
        )
        .unwrap(),
    ]
});

/// Tempo/arrangement annotations: "(Slow)", "- Ballad", "(Up-Tempo Version)", "(Bossa Nova)"
pub static TEMPO_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let kinds = r"(?:slow|fast|medium|medium[- ]tempo|up[- ]?tempo|ballad|bossa(?:\s+nova)?|latin|waltz|swing|vocal|instrumental|solo\s+piano)";
    let extra = r"(?:\s+(?:version|tempo|take|arrangement))?";
    vec![
        Regex::new(&format!(r"\s*[\(\[]{kinds}{extra}[\)\]]")).unwrap(),
        Regex::new(&format!(r"\s*-\s*{kinds}{extra}\s*$")).unwrap(),
    ]
});

/// Take/version/alternate annotations: "(Alternate Take)", "(Take 3)", "- Alt. Take 2",
/// "(Mono Version)", ", take 5"
pub static TAKE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(
            r"\s*[\(\[](?:alt(?:ernate|\.)?(?:\s+(?:take|version|mix))?(?:\s*#?\d+)?|(?:master|false\s+start|breakdown)\s+take(?:\s*#?\d+)?|take\s*#?\d+|outtake|[a-z0-9 ]*\bversion(?:\s*#?\d+)?)[\)\]]",
        )
        .unwrap(),
        Regex::new(
            r"\s*-\s*(?:alt(?:ernate|\.)?(?:\s+(?:take|version|mix))?(?:\s*#?\d+)?|take\s*#?\d+|outtake|[a-z0-9 ]*\bversion(?:\s*#?\d+)?)\s*$",
        )
        .unwrap(),
        Regex::new(r"\s*,\s*take\s*#?\d+\s*$").unwrap(),
    ]
});

/// Bare ensemble words, dropped wherever they appear as whole words.
pub static ENSEMBLE_WORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:trio|quartet|quintet|sextet|orchestra|band|ensemble)\b").unwrap());

/// Punctuation with no matching value. Parentheses survive for the similarity retry.
pub static STRAY_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?,;:.*]").unwrap());

pub static SLASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*/\s*").unwrap());

/// Hyphen with surrounding space, collapsed to a bare hyphen.
pub static SPACED_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-+\s*").unwrap());

pub static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\(\[][^)\]]*[\)\]]").unwrap());

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
/// Used to filter out accents during normalization.
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0x20D0..=0x20FF | 0xFE20..=0xFE2F)
}

/// Fold Unicode text to lowercase ASCII by applying NFKD decomposition and removing combining marks.
/// e.g., "Beyoncé" → "beyonce", "naïve" → "naive"
pub fn fold_to_ascii(s: &str) -> String {
    let stripped: String = s.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    // Then transliterate any remaining non-ASCII (Cyrillic, Hebrew, CJK, etc.)
    any_ascii(&stripped).to_lowercase()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn apply_all(patterns: &[Regex], s: String) -> String {
    patterns
        .iter()
        .fold(s, |acc, p| p.replace_all(&acc, "").into_owned())
}

/// Remove "(...)" and "[...]" groups.
/// e.g., "who cares (as long as you care for me)" → "who cares"
pub fn strip_parentheticals(s: &str) -> String {
    collapse_whitespace(&PARENTHETICAL.replace_all(s, " "))
}

/// Drop one leading English article ("the", "a", "an").
pub fn strip_leading_article(s: &str) -> &str {
    let trimmed = s.trim_start();
    for article in ["the ", "a ", "an "] {
        let n = article.len();
        if trimmed.is_char_boundary(n) && trimmed[..n].eq_ignore_ascii_case(article) {
            return trimmed[n..].trim_start();
        }
    }
    trimmed
}

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

fn normalize_pass(text: &str) -> String {
    let lowered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if DASH_CHARS.contains(&c) { '-' } else { c })
        .collect();

    let mut s: String = fold_to_ascii(&lowered)
        .chars()
        .filter(|c| !DOUBLE_QUOTE_CHARS.contains(c))
        .map(|c| if APOSTROPHE_CHARS.contains(&c) { ' ' } else { c })
        .collect();

    s = apply_all(&LIVE_PATTERNS, s);
    s = apply_all(&RECORDED_PATTERNS, s);
    s = apply_all(&REMASTER_PATTERNS, s);
    s = apply_all(&FEATURE_PATTERNS, s);
    s = apply_all(&SOURCE_PATTERNS, s);
    s = apply_all(&VENUE_DATE_PATTERNS, s);
    s = apply_all(&TEMPO_PATTERNS, s);
    s = apply_all(&TAKE_PATTERNS, s);
    s = ENSEMBLE_WORDS.replace_all(&s, "").into_owned();

    s = s.replace(" & ", " and ");
    s = SLASH.replace_all(&s, " ").into_owned();
    s = STRAY_PUNCTUATION.replace_all(&s, "").into_owned();
    s = SPACED_HYPHEN.replace_all(&s, "-").into_owned();

    collapse_whitespace(&s).trim_matches('-').trim().to_string()
}

/// Normalize a title or name for comparison.
///
/// Total and idempotent: the rule set is re-applied until the text stops
/// changing, so stacked annotations ("- Ballad (Take 2)") are removed
/// regardless of which rule exposes which.
pub fn normalize(text: &str) -> String {
    // After the first pass the text is lowercase ASCII and every rule only
    // deletes, except " & " -> " and ", which consumes an '&'. Each further
    // pass therefore shortens the text or removes an '&' until it is stable.
    let mut current = normalize_pass(text);
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Light normalization for building external search queries.
/// Only unifies dash and quote characters; case, annotations and spacing are kept.
pub fn normalize_for_search(text: &str) -> String {
    text.chars()
        .map(|c| {
            if DASH_CHARS.contains(&c) {
                '-'
            } else if APOSTROPHE_CHARS.contains(&c) {
                '\''
            } else if DOUBLE_QUOTE_CHARS.contains(&c) {
                '"'
            } else {
                c
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
