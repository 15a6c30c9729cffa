//! Testing utilities for ironshard runs.
//!
//! Helpers for writing CSV inputs, reading outputs back, and checking the
//! properties a run must uphold:
//!
//! - **Fixtures**: generate input files ([`write_numbered_csv`], [`write_csv_lines`])
//! - **Readers**: parse an output file into header + rows ([`read_rows`])
//! - **Assertions**: [`assert_rows_equal`], [`assert_monotonic_column`], [`assert_dir_empty`]
//!
//! # Quick Start
//!
//! ```no_run
//! use ironshard::testing::*;
//! use ironshard::{Config, Identity, process_csv};
//!
//! # fn main() -> anyhow::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let work = dir.path().join("work");
//! std::fs::create_dir(&work)?;
//! let input = write_numbered_csv(dir.path().join("in.csv"), 1_000)?;
//! let output = dir.path().join("out.csv");
//!
//! process_csv(&input, &output, &Identity, &Config::default().with_temp_dir(&work))?;
//!
//! let (header, rows) = read_rows(&output)?;
//! assert_eq!(header, vec!["pos", "name", "amount"]);
//! assert_monotonic_column(&header, &rows, "pos");
//! assert_dir_empty(&work);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
