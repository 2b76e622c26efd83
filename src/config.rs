// src/config.rs

use clap::Parser;
use google_cloud_auth::credentials::CredentialsFile;
use std::{env, fmt, num::NonZeroUsize, path::PathBuf};
use url::Url;

use crate::error::{ExportError, Result};

/// Service-account JSON blob.
pub const CREDENTIALS_VAR: &str = "GOOGLE_CREDENTIALS";
/// Spreadsheet id to read from.
pub const SHEET_ID_VAR: &str = "SHEET_ID";

pub const DEFAULT_RANGE: &str = "Stevner";
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Command-line overrides. Credentials and the sheet id only come from the
/// environment.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheet-export")]
#[command(
    author,
    version,
    about = "Export a spreadsheet range to chunked JSON files"
)]
pub struct Args {
    /// Named range (or sheet title) to read
    #[arg(short, long, default_value = DEFAULT_RANGE)]
    pub range: String,

    /// Records per chunk file
    #[arg(short, long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Root directory for `data.json` / `data/`
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_API_BASE, hide = true)]
    pub api_base: String,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            range: DEFAULT_RANGE.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            out_dir: PathBuf::from("."),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Fully resolved run configuration.
pub struct Config {
    pub credentials: CredentialsFile,
    pub sheet_id: String,
    pub range: String,
    pub chunk_size: NonZeroUsize,
    pub out_dir: PathBuf,
    pub api_base: Url,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_email", &self.credentials.client_email)
            .field("sheet_id", &self.sheet_id)
            .field("range", &self.range)
            .field("chunk_size", &self.chunk_size)
            .field("out_dir", &self.out_dir)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

impl Config {
    /// Resolve against the process environment.
    pub fn from_env(args: Args) -> Result<Self> {
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    /// Resolve using `lookup` for the two required values.
    ///
    /// Both values are checked before the credentials are parsed, so a
    /// missing sheet id is reported as such even when the credentials are
    /// also malformed.
    pub fn from_lookup<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_credentials = require(&lookup, CREDENTIALS_VAR)?;
        let sheet_id = require(&lookup, SHEET_ID_VAR)?;

        let chunk_size = NonZeroUsize::new(args.chunk_size).ok_or_else(|| {
            ExportError::InvalidOption("chunk size must be at least 1".to_string())
        })?;

        let credentials = parse_credentials(&raw_credentials)?;
        let api_base = Url::parse(&args.api_base)?;

        Ok(Self {
            credentials,
            sheet_id,
            range: args.range,
            chunk_size,
            out_dir: args.out_dir,
            api_base,
        })
    }
}

fn require<F>(lookup: &F, key: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ExportError::Configuration(key)),
    }
}

/// Parse a service-account JSON blob.
pub fn parse_credentials(raw: &str) -> Result<CredentialsFile> {
    serde_json::from_str(raw).map_err(ExportError::Parse)
}
