//! Guards for report output paths.
//!
//! A report run must never clobber the job files it was given.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that a report path is safe to write.
///
/// Checks:
/// - Output must have a `.json` extension
/// - Output cannot be the same file as any input (compared after
///   canonicalization when both exist)
pub fn validate_output_path(output: &Path, inputs: &[&Path]) -> Result<()> {
    let is_json = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: output file '{}' must have a .json extension",
            output.display()
        );
    }

    for input in inputs {
        if same_file(output, input) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as input '{}'",
                output.display(),
                input.display()
            );
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
