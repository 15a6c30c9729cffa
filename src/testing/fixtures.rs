//! Input fixtures and output readers.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write a CSV with header `pos,name,amount` and `rows` data rows.
///
/// `pos` is the 0-based row position, so the column doubles as an order tag
/// for [`assert_monotonic_column`](super::assert_monotonic_column). Names vary
/// in length to make byte-based chunk boundaries land mid-record.
///
/// # Example
///
/// ```
/// use ironshard::testing::{read_rows, write_numbered_csv};
///
/// let dir = tempfile::tempdir().unwrap();
/// let path = write_numbered_csv(dir.path().join("in.csv"), 3).unwrap();
/// let (header, rows) = read_rows(&path).unwrap();
/// assert_eq!(header, vec!["pos", "name", "amount"]);
/// assert_eq!(rows.len(), 3);
/// ```
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_numbered_csv(path: impl AsRef<Path>, rows: usize) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    writeln!(w, "pos,name,amount")?;
    for i in 0..rows {
        let name = "x".repeat(i % 13 + 1);
        writeln!(w, "{i},{name},{}", (i * 37) % 1000)?;
    }
    w.flush()?;
    Ok(path)
}

/// Write `header` and `lines` verbatim, one per line.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_csv_lines(path: impl AsRef<Path>, header: &str, lines: &[&str]) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    let mut text = String::with_capacity(header.len() + 1 + lines.iter().map(|l| l.len() + 1).sum::<usize>());
    text.push_str(header);
    text.push('\n');
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Parse a CSV file into its header and data rows.
///
/// # Errors
/// Returns an error if the file cannot be opened or parsed.
pub fn read_rows(path: impl AsRef<Path>) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let header = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        rows.push(rec.iter().map(str::to_string).collect());
    }
    Ok((header, rows))
}

/// Return the body of a CSV file (everything after the first line).
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_body(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let start = bytes.iter().position(|&b| b == b'\n').map_or(bytes.len(), |i| i + 1);
    Ok(bytes[start..].to_vec())
}
