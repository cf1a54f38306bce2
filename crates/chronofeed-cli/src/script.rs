//! Batch execution: one JSON command per line, one JSON result per line.
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde_json::json;

use chronofeed::Chronofeed;

use crate::commands::CommandRegistry;
use crate::error::CliResult;

/// Summary of a script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptOutcome {
    pub executed: usize,
    pub failed: usize,
}

/// Run every command in `reader`, writing results to `out`.
///
/// Stops at the first failing command unless `keep_going` is set.
pub fn run_script<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    feed: &Chronofeed,
    keep_going: bool,
) -> CliResult<ScriptOutcome> {
    let mut outcome = ScriptOutcome::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        outcome.executed += 1;
        match CommandRegistry::call_line(line, feed) {
            Ok(result) => writeln!(out, "{}", json!({ "line": idx + 1, "result": result }))?,
            Err(e) => {
                outcome.failed += 1;
                tracing::warn!("Line {}: {e}", idx + 1);
                let mut failure = e.to_json();
                failure["line"] = json!(idx + 1);
                writeln!(out, "{failure}")?;
                if !keep_going {
                    break;
                }
            }
        }
    }

    Ok(outcome)
}

/// Run a script file.
pub fn run_script_file<W: Write>(
    path: &Path,
    out: &mut W,
    feed: &Chronofeed,
    keep_going: bool,
) -> CliResult<ScriptOutcome> {
    let file = std::fs::File::open(path)?;
    tracing::info!("Running script: {}", path.display());
    run_script(BufReader::new(file), out, feed, keep_going)
}
