//! Preview how raw titles normalize before running a reconciliation.
//! Usage: cargo run --release --bin preview-normalize -- <titles.txt> [--artists]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use tracklist_reconcile::normalize::{normalize, normalize_for_search, strip_parentheticals};
use tracklist_reconcile::variants::{canonical_artist, is_compilation_artist};

#[derive(Parser)]
#[command(name = "preview-normalize")]
#[command(about = "Show comparison and search forms for a list of titles or artist names")]
struct Args {
    /// Text file with one title per line
    input: PathBuf,

    /// Treat lines as artist names (ensemble suffixes, nicknames, compilations)
    #[arg(long)]
    artists: bool,

    /// Number of changed examples to print
    #[arg(long, default_value = "30")]
    examples: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let mut changed = 0usize;
    let mut emptied = 0usize;
    let mut parenthetical = 0usize;
    let mut search_changed = 0usize;
    let mut compilations = 0usize;
    let mut examples: Vec<(String, String, String)> = Vec::new();

    for line in &lines {
        let normalized = if args.artists {
            normalize(&canonical_artist(line))
        } else {
            normalize(line)
        };
        let search = normalize_for_search(line);

        if search != *line {
            search_changed += 1;
        }
        if args.artists && is_compilation_artist(line) {
            compilations += 1;
        }
        if normalized.is_empty() {
            emptied += 1;
        }
        if strip_parentheticals(&normalized) != normalized {
            parenthetical += 1;
        }
        if normalized != line.to_lowercase() {
            changed += 1;
            if examples.len() < args.examples {
                examples.push((line.to_string(), normalized, search));
            }
        }
    }

    let total = lines.len();
    let pct = |n: usize| if total == 0 { 0.0 } else { 100.0 * n as f64 / total as f64 };

    println!("\n=== NORMALIZATION PREVIEW ===\n");
    println!("Lines:                 {:>7}", total);
    println!("Changed beyond case:   {:>7} ({:.2}%)", changed, pct(changed));
    println!("Search form changed:   {:>7} ({:.2}%)", search_changed, pct(search_changed));
    println!("Kept parentheticals:   {:>7}", parenthetical);
    println!("Normalized to empty:   {:>7}", emptied);
    if args.artists {
        println!("Compilation credits:   {:>7}", compilations);
    }

    println!("\n=== EXAMPLES ===\n");
    for (raw, normalized, search) in &examples {
        println!("\"{}\"", raw);
        println!("  COMPARE: \"{}\"", normalized);
        println!("  SEARCH:  \"{}\"", search);
        println!();
    }

    Ok(())
}
