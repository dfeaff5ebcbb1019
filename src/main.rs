use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tracklist_reconcile::config::Thresholds;
use tracklist_reconcile::progress::{create_progress_bar, format_duration, log_progress, set_log_only};
use tracklist_reconcile::reconcile::{load_jobs, run_job, write_reports, JobReport};
use tracklist_reconcile::safety::validate_output_path;
use tracklist_reconcile::stats::ReconcileStats;

#[derive(Parser)]
#[command(name = "tracklist-reconcile")]
#[command(about = "Match canonical track lists against candidate catalog releases")]
struct Args {
    /// Jobs file: JSON array of {canonical, candidates}
    input: PathBuf,

    /// Report file (.json). Printed to stdout when omitted.
    output: Option<PathBuf>,

    /// Use strict artist/album thresholds
    #[arg(long)]
    strict: bool,

    /// Thresholds JSON file; fields it omits keep their defaults
    #[arg(long, conflicts_with = "strict")]
    config: Option<PathBuf>,

    #[arg(long)]
    min_track_similarity: Option<f64>,

    #[arg(long)]
    min_artist_similarity: Option<f64>,

    #[arg(long)]
    min_album_similarity: Option<f64>,

    #[arg(long)]
    max_position_gap: Option<u32>,

    #[arg(long)]
    min_matched_tracks: Option<usize>,

    /// Write run statistics to this file
    #[arg(long)]
    stats: Option<PathBuf>,

    #[arg(long, default_value = "0")]
    workers: usize,

    /// Hide progress bars, print tail-friendly progress lines
    #[arg(long)]
    log_only: bool,
}

const LOG_INTERVAL: u64 = 100;

fn build_thresholds(args: &Args) -> Result<Thresholds> {
    let mut thresholds = match &args.config {
        Some(path) => Thresholds::from_json_file(path)?,
        None if args.strict => Thresholds::strict(),
        None => Thresholds::lenient(),
    };

    if let Some(v) = args.min_track_similarity {
        thresholds.min_track_similarity = v;
    }
    if let Some(v) = args.min_artist_similarity {
        thresholds.min_artist_similarity = v;
    }
    if let Some(v) = args.min_album_similarity {
        thresholds.min_album_similarity = v;
    }
    if let Some(v) = args.max_position_gap {
        thresholds.max_position_gap = v;
    }
    if let Some(v) = args.min_matched_tracks {
        thresholds.min_matched_tracks = v;
    }
    Ok(thresholds)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();
    set_log_only(args.log_only);

    if args.workers > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.workers)
            .build_global()
            .context("Failed to set thread pool size")?;
    }

    if let Some(output) = &args.output {
        let mut inputs = vec![args.input.as_path()];
        if let Some(config) = &args.config {
            inputs.push(config.as_path());
        }
        validate_output_path(output, &inputs)?;
    }
    if let Some(stats_path) = &args.stats {
        validate_output_path(stats_path, &[args.input.as_path()])?;
    }

    let start = Instant::now();
    let thresholds = build_thresholds(&args)?;

    eprintln!("Loading jobs: {:?}", args.input);
    let jobs = load_jobs(&args.input)?;
    let total = jobs.len() as u64;
    eprintln!("Loaded {} jobs", total);

    let pb = create_progress_bar(total, "Reconciling");
    let done = AtomicU64::new(0);
    let reports: Vec<JobReport> = jobs
        .par_iter()
        .map(|job| {
            let report = run_job(job, &thresholds);
            pb.inc(1);
            let current = done.fetch_add(1, Ordering::Relaxed) + 1;
            log_progress("reconcile", current, total, LOG_INTERVAL);
            report
        })
        .collect();
    pb.finish_with_message(format!("Reconciled {} jobs", reports.len()));

    let mut stats = ReconcileStats::default();
    for report in &reports {
        stats.record(report);
    }
    stats.elapsed_seconds = start.elapsed().as_secs_f64();

    match &args.output {
        Some(output) => {
            write_reports(output, &reports)?;
            eprintln!("Report written: {:?}", output);
        }
        None => {
            let json = serde_json::to_string_pretty(&reports)?;
            println!("{}", json);
        }
    }

    stats.log_phase("final");
    if let Some(stats_path) = &args.stats {
        stats
            .write_to_file(stats_path)
            .with_context(|| format!("Failed to write stats {}", stats_path.display()))?;
    }

    eprintln!("\n{:=<60}", "");
    eprintln!("Reconciliation complete!");
    eprintln!("  Jobs: {}", stats.jobs);
    eprintln!("  Matched: {} ({:.1}%)", stats.accepted_jobs, stats.match_rate());
    eprintln!("  Unmatched: {}", stats.unmatched_jobs);
    eprintln!("  Elapsed: {}", format_duration(start.elapsed()));
    eprintln!("{:=<60}", "");

    Ok(())
}
