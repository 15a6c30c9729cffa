//! Run configuration threaded explicitly through every pipeline stage.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Read/copy buffer size used by the splitter and the merger.
pub const DEFAULT_READ_BUFFER: usize = 8192;

/// Knobs for one split → transform → merge run.
///
/// ```
/// use ironshard::Config;
///
/// let cfg = Config::default().with_chunks(4).with_workers(2);
/// assert_eq!(cfg.chunk_count, 4);
/// assert_eq!(cfg.max_workers, 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of chunks the input is split into.
    pub chunk_count: usize,
    /// Size of the worker pool.
    pub max_workers: usize,
    /// Buffer size for raw byte copies.
    pub read_buffer: usize,
    /// Directory for transient chunk files; the host temp dir when `None`.
    pub temp_dir: Option<PathBuf>,
    /// Dispatch each chunk as soon as it is written instead of after the whole split.
    pub overlap_split: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_count: num_cpus::get().max(1),
            max_workers: num_cpus::get().max(6),
            read_buffer: DEFAULT_READ_BUFFER,
            temp_dir: None,
            overlap_split: true,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_chunks(mut self, n: usize) -> Self {
        self.chunk_count = n.max(1);
        self
    }

    #[must_use]
    pub fn with_workers(mut self, n: usize) -> Self {
        self.max_workers = n.max(1);
        self
    }

    #[must_use]
    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer = bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_overlap(mut self, overlap: bool) -> Self {
        self.overlap_split = overlap;
        self
    }

    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    /// If the file cannot be read or does not describe a `Config`.
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        let (chunks, workers, buffer) = (cfg.chunk_count, cfg.max_workers, cfg.read_buffer);
        Ok(cfg.with_chunks(chunks).with_workers(workers).with_read_buffer(buffer))
    }

    /// Directory transient files are created in.
    #[must_use]
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .as_deref()
            .map_or_else(std::env::temp_dir, Path::to_path_buf)
    }

    /// A `tempfile` builder placing files in [`Config::temp_dir`].
    pub(crate) fn tempfile(&self, prefix: &str) -> std::io::Result<tempfile::NamedTempFile> {
        tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".csv")
            .tempfile_in(self.temp_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_cpu_count() {
        let cfg = Config::default();
        assert_eq!(cfg.chunk_count, num_cpus::get().max(1));
        assert!(cfg.max_workers >= 6);
        assert_eq!(cfg.read_buffer, DEFAULT_READ_BUFFER);
        assert!(cfg.overlap_split);
    }

    #[test]
    fn setters_clamp_to_one() {
        let cfg = Config::default().with_chunks(0).with_workers(0).with_read_buffer(0);
        assert_eq!((cfg.chunk_count, cfg.max_workers, cfg.read_buffer), (1, 1, 1));
    }

    #[test]
    fn partial_json_uses_defaults() -> anyhow::Result<()> {
        let cfg: Config = serde_json::from_str(r#"{"chunk_count": 3, "overlap_split": false}"#)?;
        assert_eq!(cfg.chunk_count, 3);
        assert!(!cfg.overlap_split);
        assert_eq!(cfg.read_buffer, DEFAULT_READ_BUFFER);
        Ok(())
    }

    #[test]
    fn json_file_is_loaded_and_clamped() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"max_workers": 3, "read_buffer": 0, "temp_dir": "/scratch"}"#)?;
        let cfg = Config::from_json_file(&path)?;
        assert_eq!(cfg.max_workers, 3);
        assert_eq!(cfg.read_buffer, 1);
        assert_eq!(cfg.temp_dir(), PathBuf::from("/scratch"));
        assert!(Config::from_json_file(dir.path().join("missing.json")).is_err());
        Ok(())
    }
}
