//! Counters and phase timings for one pipeline run.
//!
//! A [`RunSummary`] is returned by [`process_csv`](crate::process_csv). It can
//! be printed for humans or written as JSON for tooling:
//!
//! ```no_run
//! use ironshard::{AddColumn, Config, process_csv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let summary = process_csv("in.csv", "out.csv", &AddColumn::default(), &Config::default())?;
//! summary.print();
//! summary.save_to_file("run.json")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Wall-clock time spent in one named phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhaseTiming {
    pub phase: String,
    pub millis: u64,
}

/// What a completed run did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub transform: String,
    pub input_bytes: u64,
    pub chunks: usize,
    pub workers: usize,
    pub rows: u64,
    pub output_bytes: u64,
    pub output_header: Vec<String>,
    pub phases: Vec<PhaseTiming>,
}

impl RunSummary {
    /// Append the duration of a finished phase.
    pub fn record_phase(&mut self, phase: &str, elapsed: Duration) {
        self.phases.push(PhaseTiming {
            phase: phase.to_string(),
            millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// Sum of all recorded phases.
    #[must_use]
    pub fn total_millis(&self) -> u64 {
        self.phases.iter().map(|p| p.millis).sum()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut value = json!(self);
        value["total_millis"] = json!(self.total_millis());
        value
    }

    /// Print a short human-readable report to stdout.
    pub fn print(&self) {
        println!("\n========== Run Summary ==========");
        println!("Input:      {} ({} bytes)", self.input.display(), self.input_bytes);
        println!("Output:     {} ({} bytes)", self.output.display(), self.output_bytes);
        println!("Transform:  {}", self.transform);
        println!("Chunks:     {} on {} workers", self.chunks, self.workers);
        println!("Rows:       {}", self.rows);
        println!("---------------------------------");
        for p in &self.phases {
            println!("{:<11} {} ms", format!("{}:", p.phase), p.millis);
        }
        println!("=================================\n");
    }

    /// Write the summary as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let formatted = serde_json::to_string_pretty(&self.to_json())?;
        file.write_all(formatted.as_bytes())?;
        Ok(())
    }
}
