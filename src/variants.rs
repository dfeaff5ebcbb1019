//! Artist name variants.
//!
//! Rescues artist comparisons that fail literal similarity: ensemble
//! suffixes ("Lynne Arriale Trio"), first-name nicknames ("Dave Holland" vs
//! "David Holland") and compilation credits ("Various Artists").
//!
//! The tables here are hand-tuned against real catalog data. Keep them as
//! literal rule tables.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::normalize::fold_to_ascii;

// ============================================================================
// ENSEMBLE SUFFIXES
// ============================================================================

/// Trailing ensemble word, whole-word and case-insensitive.
pub static ENSEMBLE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\s+(?:trio|quartet|quintet|sextet|septet|octet|nonet|tentet|big\s+band|band|orchestra|ensemble|group|combo|all[- ]stars)\s*$",
    )
    .unwrap()
});

/// Remainders that mean the "suffix" was the name itself ("The Band").
const BARE_ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Remove trailing ensemble words from an artist name.
/// e.g., "Lynne Arriale Trio" → "Lynne Arriale", "Miles Davis" → "Miles Davis"
///
/// Repeated suffixes ("X Big Band Orchestra") are all removed. The input is
/// returned trimmed but otherwise unchanged when nothing matches or when
/// stripping would leave nothing but an article.
pub fn strip_ensemble_suffix(artist: &str) -> String {
    let mut current = artist.trim().to_string();
    while let Some(m) = ENSEMBLE_SUFFIX.find(&current) {
        let remainder = current[..m.start()].trim_end();
        if remainder.is_empty() || BARE_ARTICLES.iter().any(|a| remainder.eq_ignore_ascii_case(a)) {
            break;
        }
        current = remainder.to_string();
    }
    current
}

// ============================================================================
// NICKNAMES
// ============================================================================

/// Nickname → canonical first name. Values are never keys.
pub static NICKNAMES: Lazy<FxHashMap<&str, &str>> = Lazy::new(|| {
    let mut m = FxHashMap::default();
    m.insert("dave", "david");
    m.insert("davey", "david");
    m.insert("bill", "william");
    m.insert("billy", "william");
    m.insert("willie", "william");
    m.insert("bob", "robert");
    m.insert("bobby", "robert");
    m.insert("rob", "robert");
    m.insert("robbie", "robert");
    m.insert("jim", "james");
    m.insert("jimmy", "james");
    m.insert("jimmie", "james");
    m.insert("mike", "michael");
    m.insert("mikey", "michael");
    m.insert("tom", "thomas");
    m.insert("tommy", "thomas");
    m.insert("joe", "joseph");
    m.insert("joey", "joseph");
    m.insert("dick", "richard");
    m.insert("rick", "richard");
    m.insert("ricky", "richard");
    m.insert("chuck", "charles");
    m.insert("charlie", "charles");
    m.insert("ed", "edward");
    m.insert("eddie", "edward");
    m.insert("fred", "frederick");
    m.insert("freddie", "frederick");
    m.insert("freddy", "frederick");
    m.insert("tony", "anthony");
    m.insert("steve", "steven");
    m.insert("stevie", "steven");
    m.insert("ken", "kenneth");
    m.insert("kenny", "kenneth");
    m.insert("larry", "lawrence");
    m.insert("jerry", "gerald");
    m.insert("pat", "patrick");
    m.insert("ron", "ronald");
    m.insert("ronnie", "ronald");
    m.insert("don", "donald");
    m.insert("donny", "donald");
    m.insert("sam", "samuel");
    m.insert("sammy", "samuel");
    m.insert("dan", "daniel");
    m.insert("danny", "daniel");
    m.insert("nick", "nicholas");
    m.insert("matt", "matthew");
    m.insert("chris", "christopher");
    m.insert("hank", "henry");
    m.insert("walt", "walter");
    m.insert("ben", "benjamin");
    m.insert("benny", "benjamin");
    m.insert("johnny", "john");
    m.insert("herb", "herbert");
    m.insert("gil", "gilbert");
    m
});

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Replace whole-word nicknames with their canonical first name.
/// Unknown words are left untouched, including their case.
/// e.g., "Dave Holland" → "david Holland"
pub fn normalize_name_variants(text: &str) -> String {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        let lower = word.to_lowercase();
        match NICKNAMES.get(lower.as_str()) {
            Some(canonical) => (*canonical).to_string(),
            None => word.to_string(),
        }
    })
    .into_owned()
}

/// Ensemble suffix and nickname canonicalization together.
pub fn canonical_artist(artist: &str) -> String {
    normalize_name_variants(&strip_ensemble_suffix(artist))
}

// ============================================================================
// COMPILATION ARTISTS
// ============================================================================

/// Credits that name no specific performer, including non-English translations.
pub static COMPILATION_ARTISTS: Lazy<FxHashSet<&str>> = Lazy::new(|| {
    [
        // English
        "various artists",
        "various",
        "various performers",
        "va",
        "v.a.",
        "v/a",
        "v. a.",
        "compilation",
        "multiple artists",
        "multi-artists",
        "assorted artists",
        "original soundtrack",
        "soundtrack",
        "original cast",
        "original broadway cast",
        "unknown artist",
        // German
        "verschiedene interpreten",
        "verschiedene kunstler",
        "diverse interpreten",
        "diverse",
        // French
        "artistes divers",
        "artistes varies",
        "divers artistes",
        "compilation artistes",
        // Spanish
        "varios artistas",
        "varios interpretes",
        // Italian
        "artisti vari",
        "artisti diversi",
        "vari artisti",
        // Portuguese
        "varios artistas",
        "artistas variados",
        // Dutch
        "diverse artiesten",
        "verschillende artiesten",
        // Swedish, Norwegian, Danish
        "blandade artister",
        "diverse artister",
        "forskellige kunstnere",
        // Russian (folded and native)
        "различные исполнители",
        "разные исполнители",
        "сборник",
        "raznye ispolniteli",
        "razlichnye ispolniteli",
        // Japanese
        "ヴァリアス・アーティスト",
        "オムニバス",
        "omunibasu",
    ]
    .into_iter()
    .collect()
});

/// Whether an artist credit is a compilation placeholder like "Various Artists".
pub fn is_compilation_artist(artist: &str) -> bool {
    let lower = artist.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if COMPILATION_ARTISTS.contains(lower.as_str()) {
        return true;
    }
    let folded = fold_to_ascii(&lower);
    let folded = folded.trim();
    COMPILATION_ARTISTS.contains(folded) || folded.starts_with("various artists")
}
