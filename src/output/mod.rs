// src/output/mod.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::transform::{Record, Table};

pub mod manifest;

pub use manifest::Manifest;

/// Written instead of `data/` when the sheet has no data rows.
pub const EMPTY_FILE: &str = "data.json";
pub const DATA_DIR: &str = "data";
pub const FULL_FILE: &str = "full.json";
pub const MANIFEST_FILE: &str = "manifest.json";

pub fn chunk_file_name(index: usize) -> String {
    format!("chunk-{}.json", index)
}

/// What a run left on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No data rows: only `data.json` (`[]`) was written.
    Empty(PathBuf),
    /// `data/` was populated as described by the manifest.
    Written(Manifest),
}

/// Writes a table under `root` as `data/full.json`, `data/chunk-N.json` and
/// `data/manifest.json`.
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    root: PathBuf,
    chunk_size: NonZeroUsize,
}

impl ChunkWriter {
    pub fn new(root: impl Into<PathBuf>, chunk_size: NonZeroUsize) -> Self {
        Self {
            root: root.into(),
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn export(&self, table: &Table) -> Result<Outcome> {
        self.export_at(table, Utc::now())
    }

    /// Same as [`export`](Self::export) with a fixed manifest timestamp.
    pub fn export_at(&self, table: &Table, now: DateTime<Utc>) -> Result<Outcome> {
        if table.is_empty() {
            info!("No data found.");
            return self.write_empty().map(Outcome::Empty);
        }
        self.write_chunked(table, now).map(Outcome::Written)
    }

    /// Write `[]` to `<root>/data.json`. Nothing under `data/` is touched.
    pub fn write_empty(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| ExportError::fs(&self.root, e))?;
        let path = self.root.join(EMPTY_FILE);
        write_json(&path, &[] as &[Record])?;
        Ok(path)
    }

    fn write_chunked(&self, table: &Table, now: DateTime<Utc>) -> Result<Manifest> {
        let dir = self.data_dir();
        fs::create_dir_all(&dir).map_err(|e| ExportError::fs(&dir, e))?;

        write_json(&dir.join(FULL_FILE), &table.records)?;

        let size = self.chunk_size.get();
        let mut chunks = Vec::with_capacity(table.records.len().div_ceil(size));
        for (index, chunk) in table.records.chunks(size).enumerate() {
            let path = dir.join(chunk_file_name(index));
            write_json(&path, chunk)?;
            debug!(index, rows = chunk.len(), "wrote chunk");
            chunks.push(index);
        }

        let manifest = Manifest::new(
            table.records.len(),
            size,
            chunks,
            table.headers.clone(),
            now,
        );
        write_json(&dir.join(MANIFEST_FILE), &manifest)?;

        info!(chunks = manifest.total_chunks, "created chunks and manifest");
        info!("data saved to {}", dir.display());
        Ok(manifest)
    }
}

/// Serialize compactly to a temp sibling, then rename over `path`.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let file = fs::File::create(&tmp_path).map_err(|e| ExportError::fs(&tmp_path, e))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, value).map_err(|source| ExportError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|e| ExportError::fs(&tmp_path, e))?;
    drop(out);

    fs::rename(&tmp_path, path).map_err(|e| ExportError::fs(path, e))?;
    Ok(())
}
