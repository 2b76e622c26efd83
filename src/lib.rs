pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod transform;

#[cfg(test)]
mod testing;

use reqwest::Client;
use tracing::info;

pub use config::{Args, Config};
pub use error::{ExportError, Result};
pub use output::{ChunkWriter, Manifest, Outcome};
pub use transform::{grid_to_table, CellGrid, Record, Table};

/// Authenticate, fetch the configured range and write it under `cfg.out_dir`.
pub async fn run(client: &Client, cfg: &Config) -> Result<Outcome> {
    let token = fetch::auth::access_token(&cfg.credentials).await?;
    run_with_token(client, cfg, &token).await
}

/// [`run`] with an access token that was obtained elsewhere.
pub async fn run_with_token(client: &Client, cfg: &Config, token: &str) -> Result<Outcome> {
    let grid = fetch::fetch_grid(client, cfg, token).await?;
    let table = grid_to_table(grid);
    info!(rows = table.records.len(), "fetched rows");

    ChunkWriter::new(&cfg.out_dir, cfg.chunk_size).export(&table)
}
