//! Command-line front end: transform a CSV in parallel.
//!
//! ```sh
//! ironshard --infilename trips.csv --outfilename output.csv --workers 8
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ironshard::{AddColumn, Config, Identity, RowTransform, process_csv};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TransformKind {
    /// Copy every row unchanged.
    Identity,
    /// Set `--column-name` to `--column-value` on every row.
    AddColumn,
}

#[derive(Parser, Debug)]
#[command(name = "ironshard", version, about = "Apply a row transform to a CSV file in parallel")]
struct Args {
    /// CSV file to read.
    #[arg(long, visible_alias = "input")]
    infilename: PathBuf,

    /// File to write; replaced if it exists.
    #[arg(long, visible_alias = "output", default_value = "output.csv")]
    outfilename: PathBuf,

    #[arg(long, value_enum, default_value_t = TransformKind::AddColumn)]
    transform: TransformKind,

    #[arg(long, default_value = "new_column")]
    column_name: String,

    #[arg(long, default_value = "default_value")]
    column_value: String,

    /// Number of chunks (default: logical CPU count).
    #[arg(long)]
    chunks: Option<usize>,

    /// Worker threads (default: max(6, logical CPU count)).
    #[arg(long)]
    workers: Option<usize>,

    /// Copy buffer size in bytes (default: 8192).
    #[arg(long)]
    buffer_size: Option<usize>,

    /// Directory for transient chunk files (default: system temp dir).
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Finish splitting before starting any worker.
    #[arg(long)]
    no_overlap: bool,

    /// JSON file with `Config` fields; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a JSON run summary to this path.
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if self.no_overlap {
            cfg = cfg.with_overlap(false);
        }
        if let Some(n) = self.buffer_size {
            cfg = cfg.with_read_buffer(n);
        }
        if let Some(n) = self.chunks {
            cfg = cfg.with_chunks(n);
        }
        if let Some(n) = self.workers {
            cfg = cfg.with_workers(n);
        }
        if let Some(dir) = &self.temp_dir {
            cfg = cfg.with_temp_dir(dir);
        }
        Ok(cfg)
    }

    fn transform(&self) -> Box<dyn RowTransform> {
        match self.transform {
            TransformKind::Identity => Box::new(Identity),
            TransformKind::AddColumn => {
                Box::new(AddColumn::new(self.column_name.as_str(), self.column_value.as_str()))
            }
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config()?;
    let transform = args.transform();
    let summary = process_csv(&args.infilename, &args.outfilename, transform.as_ref(), &config)
        .with_context(|| format!("processing {}", args.infilename.display()))?;
    if let Some(path) = &args.summary_json {
        summary.save_to_file(path)?;
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    if let Err(e) = run(&args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}
