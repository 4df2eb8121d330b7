use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ingest_orchestrator::{IngestRequest, IngestionOrchestrator};
use tokio_util::sync::CancellationToken;

mod bootstrap;
mod cli;
mod progress;

use cli::{Cli, Commands, DirArgs, FileArgs};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("ingest error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = bootstrap::load_config(cli.config.as_deref())?;
    let orchestrator = IngestionOrchestrator::from_config(&config).await.context("failed to initialize ingestion orchestrator")?;
    let cancel = CancellationToken::new();

    match cli.command {
        Commands::File(args) => ingest_one(&orchestrator, &args, &cancel).await,
        Commands::Dir(args) => ingest_dir(&orchestrator, &args, &cancel).await,
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
    .with_env_filter(filter)
    .try_init()
    .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn ingest_one(orchestrator: &IngestionOrchestrator, args: &FileArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let path = PathBuf::from(&args.path);
    let envelope =
        run_one(orchestrator, &path, args.tenant.as_deref(), args.modality.as_deref(), args.collection.clone(), args.primary_key.as_deref(), cancel).await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if envelope.is_success() { Ok(()) } else { anyhow::bail!("ingestion failed: {}", envelope.error.unwrap_or_default()) }
}

async fn ingest_dir(orchestrator: &IngestionOrchestrator, args: &DirArgs, cancel: &CancellationToken) -> anyhow::Result<()> {
    let dir = PathBuf::from(&args.path);
    let mut entries = tokio::fs::read_dir(&dir).await.with_context(|| format!("failed to read directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }

    let progress = progress::Progress::bar(paths.len() as u64, "ingesting");
    let mut failures = 0usize;

    for path in &paths {
        let envelope = run_one(orchestrator, path, args.tenant.as_deref(), None, None, None, cancel).await;
        if !envelope.is_success() {
            failures += 1;
            tracing::warn!(path = %path.display(), error = ?envelope.error, "file failed to ingest");
        }
        progress.inc(1);
        println!("{}", serde_json::to_string(&envelope)?);
    }

    progress.finish_ok(&format!("{} ingested, {failures} failed", paths.len() - failures));

    if failures > 0 { anyhow::bail!("{failures} of {} files failed to ingest", paths.len()) } else { Ok(()) }
}

async fn run_one(
    orchestrator: &IngestionOrchestrator,
    path: &Path,
    tenant: Option<&str>,
    modality: Option<&str>,
    collection: Option<String>,
    primary_key: Option<&str>,
    cancel: &CancellationToken,
) -> ingest_core::envelope::IngestEnvelope {
    let tenant_id = tenant.map_or_else(default_tenant, str::to_string);
    let original_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown").to_string();
    let modality_hint = modality.and_then(ingest_orchestrator::modality::parse_hint);

    let request = IngestRequest {
        path,
        tenant_id: &tenant_id,
        original_name: &original_name,
        modality_hint,
        collection_hint: collection,
        primary_key_hint: primary_key,
    };

    orchestrator.process_file(request, cancel).await
}

fn default_tenant() -> String {
    std::env::var("DEFAULT_TENANT_ID").unwrap_or_else(|_| "default".to_string())
}
