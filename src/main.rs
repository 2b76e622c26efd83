use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use sheet_export::{run, Args, Config, Outcome};
use std::process;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = export(Args::parse()).await {
        error!("error fetching data: {:#}", e);
        process::exit(1);
    }
}

async fn export(args: Args) -> Result<()> {
    // ─── 2) resolve config before any I/O ───────────────────────────
    let cfg = Config::from_env(args).context("loading configuration")?;
    info!(sheet = %cfg.sheet_id, range = %cfg.range, out = %cfg.out_dir.display(), "startup");

    // ─── 3) fetch, transform, write ─────────────────────────────────
    let client = Client::new();
    match run(&client, &cfg).await? {
        Outcome::Empty(path) => info!("wrote empty dataset to {}", path.display()),
        Outcome::Written(manifest) => info!(
            rows = manifest.total_rows,
            chunks = manifest.total_chunks,
            "export complete"
        ),
    }
    Ok(())
}
