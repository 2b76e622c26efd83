// src/output/manifest.rs

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Describes how `full.json` was split. Field order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub total_rows: usize,
    pub chunk_size: usize,
    pub total_chunks: usize,
    pub chunks: Vec<usize>,
    pub headers: Vec<String>,
    pub last_updated: String,
}

impl Manifest {
    pub fn new(
        total_rows: usize,
        chunk_size: usize,
        chunks: Vec<usize>,
        headers: Vec<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_rows,
            chunk_size,
            total_chunks: chunks.len(),
            chunks,
            headers,
            last_updated: iso_timestamp(generated_at),
        }
    }
}

/// `2024-01-01T12:00:00.000Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
