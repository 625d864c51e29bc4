//! Record sinks
//!
//! A sink receives the complete batch of rows for one site once its crawl
//! finishes. The JSON-lines sink writes each file next to its destination and
//! renames it into place, so a reader never sees a half-written batch.

use crate::config::OutputConfig;
use crate::output::records::{CleanRow, RawRow};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the file written in every site directory
pub const ITEMS_FILE: &str = "items.jsonl";

/// Errors that can occur while writing a batch
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize row: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Where a batch was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    pub raw_path: PathBuf,
    pub clean_path: PathBuf,
    pub rows: usize,
}

/// Destination for per-site batches
///
/// Implementations must be shareable across site tasks.
pub trait RecordSink: Send + Sync {
    /// Writes one site's rows, replacing anything written for it before
    fn write_site(&self, site: &str, raw: &[RawRow], clean: &[CleanRow])
        -> SinkResult<SinkReceipt>;
}

/// Writes `raw/<site>[/<prefix>]/items.jsonl` and the matching `clean/` file
#[derive(Debug, Clone)]
pub struct JsonlSink {
    root: PathBuf,
    prefix: String,
}

impl JsonlSink {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(output: &OutputConfig) -> Self {
        Self::new(&output.directory, output.prefix.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the items file for `kind` (`raw` or `clean`) and `site`
    pub fn items_path(&self, kind: &str, site: &str) -> PathBuf {
        let mut path = self.root.join(kind).join(site);
        if !self.prefix.is_empty() {
            path.push(&self.prefix);
        }
        path.join(ITEMS_FILE)
    }
}

impl RecordSink for JsonlSink {
    fn write_site(
        &self,
        site: &str,
        raw: &[RawRow],
        clean: &[CleanRow],
    ) -> SinkResult<SinkReceipt> {
        let raw_path = self.items_path("raw", site);
        let clean_path = self.items_path("clean", site);

        // Both files are staged before either replaces last run's output
        let raw_tmp = write_staged(&raw_path, raw)?;
        let clean_tmp = match write_staged(&clean_path, clean) {
            Ok(tmp) => tmp,
            Err(e) => {
                discard(&raw_tmp);
                return Err(e);
            }
        };

        if let Err(e) = commit(&raw_tmp, &raw_path) {
            discard(&clean_tmp);
            return Err(e);
        }
        commit(&clean_tmp, &clean_path)?;
        tracing::debug!(
            "Wrote {} rows to {} and {}",
            raw.len(),
            raw_path.display(),
            clean_path.display()
        );

        Ok(SinkReceipt {
            raw_path,
            clean_path,
            rows: raw.len(),
        })
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes one JSON object per line to a temp file next to `path`
///
/// Returns the temp path; nothing at `path` is touched yet.
fn write_staged<T: Serialize>(path: &Path, rows: &[T]) -> SinkResult<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let tmp_path = path.with_extension("jsonl.tmp");
    let file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
    let mut writer = BufWriter::new(file);
    let written = write_rows(&mut writer, &tmp_path, rows);
    drop(writer);

    if let Err(e) = written {
        discard(&tmp_path);
        return Err(e);
    }
    Ok(tmp_path)
}

fn write_rows<T: Serialize>(
    writer: &mut impl Write,
    tmp_path: &Path,
    rows: &[T],
) -> SinkResult<()> {
    for row in rows {
        serde_json::to_writer(&mut *writer, row)?;
        writer.write_all(b"\n").map_err(io_error(tmp_path))?;
    }
    writer.flush().map_err(io_error(tmp_path))
}

/// Moves a staged file over its destination
fn commit(tmp_path: &Path, path: &Path) -> SinkResult<()> {
    fs::rename(tmp_path, path).map_err(|e| {
        discard(tmp_path);
        io_error(path)(e)
    })
}

fn discard(tmp_path: &Path) {
    if let Err(e) = fs::remove_file(tmp_path) {
        tracing::debug!("Could not remove {}: {}", tmp_path.display(), e);
    }
}
