// src/bin/oops.rs
//! Encrypt or decrypt every file under the configured root

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use oops::{list_files, Config, KeyGeneration, KeyStore, Mode, ProcessingSession, Scheme};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Encrypt or decrypt every file under a directory", long_about = None)]
struct Cli {
    /// Either "encrypt" or "decrypt"
    #[arg(long, default_value = "encrypt")]
    mode: String,

    /// Simulate the work without touching any file
    #[arg(long)]
    dry_run: bool,

    /// TOML config file (defaults to $OOPS_CONFIG, then oops.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to process
    #[arg(long)]
    root: Option<PathBuf>,

    /// Maximum files in flight, 0 for unbounded
    #[arg(long)]
    concurrency: Option<usize>,

    /// "hybrid" or "single-block"
    #[arg(long)]
    scheme: Option<String>,

    /// Modulus size used if a new key pair has to be generated
    #[arg(long)]
    bits: Option<usize>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mode: Mode = cli.mode.parse()?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load()?,
    };
    if let Some(root) = cli.root {
        config.paths.root = root;
    }
    if let Some(concurrency) = cli.concurrency {
        config.session.concurrency = concurrency;
    }
    if let Some(scheme) = &cli.scheme {
        config.session.scheme = scheme.parse::<Scheme>()?;
    }
    if let Some(bits) = cli.bits {
        config.keys.bits = bits;
    }

    info!("starting oops");

    let keys = KeyStore::from_config(&config.keys);
    if let KeyGeneration::Generated { bits } = keys
        .generate_if_absent(config.keys.bits)
        .context("failed to generate key pair")?
    {
        info!(bits, "key pair written");
    }

    let root = &config.paths.root;
    let key_files: Vec<PathBuf> = [keys.private_path(), keys.public_path()]
        .iter()
        .filter_map(|p| p.canonicalize().ok())
        .collect();
    let files: Vec<PathBuf> = list_files(root)
        .with_context(|| format!("failed to get file list under {}", root.display()))?
        .into_iter()
        .filter(|p| !key_files.contains(p))
        .collect();
    info!(total = files.len(), root = %root.display(), "total files");

    let session = ProcessingSession::new(files);
    let report = session
        .run(mode, cli.dry_run, &keys, &config.session.settings())
        .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", session.summary());
    }

    Ok(())
}
