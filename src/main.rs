use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use starsorter::{ClaudeProvider, Config, GitHubClient, RunConfig, Storage, SyncPipeline};

#[derive(Parser, Debug)]
#[command(name = "starsorter")]
#[command(version)]
#[command(about = "Sort GitHub starred repositories into category lists")]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Output folder for category lists and README
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Publish lists even when no repositories were added or removed
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables first so RUST_LOG can come from .env
    dotenvy::dotenv().ok();

    // Initialize logging
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(args.debug, rust_log.as_deref()))
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let storage = Storage::new(&config.state_dir)?;

    // Initialize clients
    let github = GitHubClient::new(&config.github_token, &config.github_api_url)?;
    let remote = github.repository(&config.target_repo);
    let llm = ClaudeProvider::new(config.anthropic_api_key.clone(), Some(config.model.clone()))?;

    let run_config = RunConfig::new(&config, expand_home(args.output), args.debug, args.force);
    let pipeline = SyncPipeline::new(
        Arc::new(github),
        Arc::new(llm),
        Arc::new(remote),
        storage,
        run_config,
    );

    tracing::info!("Syncing starred repositories into {}", config.target_repo);
    let report = pipeline.run().await?;

    tracing::info!(
        "Done: {} starred, {} removed, {} classified, {} failed batches, published: {}",
        report.starred,
        report.removed,
        report.classified,
        report.failed_batches,
        report.published
    );

    Ok(())
}

/// `RUST_LOG`, when set and valid, replaces the defaults entirely.
fn log_filter(debug: bool, rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            let level = if debug { "debug" } else { "info" };
            EnvFilter::new(format!("starsorter={},reqwest=warn", level))
        })
}

/// Expands a leading `~` to the user's home directory.
fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => {
            tracing::warn!("No home directory found, using {} as given", path.display());
            path
        }
    }
}
