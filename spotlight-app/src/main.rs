use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use futures::stream::{self, StreamExt};
use spotlight_common::observability::{LogConfig, init_logging};
use spotlight_config::{SpotlightConfig, SpotlightConfigLoader};
use spotlight_http::HttpClient;
use spotlight_social::instagram::{HighlightMediaItem, HighlightScraper, PageFetcher};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod export;
mod inputs;

use export::{determine_output_path, export_highlights_to_json};
use inputs::read_inputs;

const DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "spotlight")]
#[command(about = "Scrape story highlights from public Instagram profiles")]
#[command(version)]
struct Cli {
    /// Settings file (JSON, YAML or TOML); defaults apply when it is absent
    #[arg(long, default_value = "spotlight.json")]
    config: PathBuf,

    /// One username or profile URL per line
    #[arg(long, default_value = "data/inputs.txt")]
    input: PathBuf,

    /// Output file, or a directory to receive a timestamped file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(LogConfig::for_cli("spotlight", cli.verbose)) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = ?e, "spotlight.failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli.config);

    let inputs = read_inputs(&cli.input)?;
    if inputs.is_empty() {
        tracing::error!(input = %cli.input.display(), "spotlight.inputs.empty");
        return Ok(ExitCode::FAILURE);
    }

    let client = HttpClient::with_identity(
        &config.base_url,
        &config.user_agent,
        &config.accept_language,
    )
    .context("failed to build http client")?
    .with_timeout(config.timeout())
    .with_retries(config.max_retries);
    let scraper = HighlightScraper::new(client).with_base(&config.base_url);

    tracing::info!(
        profiles = inputs.len(),
        concurrency = config.concurrency,
        "spotlight.run.start"
    );
    let items = scrape_all(&scraper, &inputs, config.concurrency).await;

    if items.is_empty() {
        tracing::warn!("spotlight.run.no_items");
        return Ok(ExitCode::SUCCESS);
    }

    let path = determine_output_path(cli.output.as_deref(), Path::new(DATA_DIR), Utc::now());
    export_highlights_to_json(&items, &path)
        .with_context(|| format!("failed to export highlights to {}", path.display()))?;

    tracing::info!(items = items.len(), path = %path.display(), "spotlight.run.done");
    Ok(ExitCode::SUCCESS)
}

/// Settings for this run. A file that exists but cannot be used is reported and
/// replaced by defaults, the same as a missing one.
fn load_config(path: &Path) -> SpotlightConfig {
    match SpotlightConfigLoader::new().with_optional_file(path).load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "spotlight.config.invalid_using_defaults");
            SpotlightConfig::default()
        }
    }
}

/// Scrape every input with at most `concurrency` profiles in flight.
///
/// Results keep input order. A profile that fails is logged and contributes nothing.
async fn scrape_all<F: PageFetcher>(
    scraper: &HighlightScraper<F>,
    inputs: &[String],
    concurrency: usize,
) -> Vec<HighlightMediaItem> {
    let per_profile: Vec<Vec<HighlightMediaItem>> = stream::iter(inputs)
        .map(|input| async move {
            match scraper.scrape_highlights(input).await {
                Ok(items) => {
                    tracing::info!(%input, items = items.len(), "spotlight.profile.done");
                    items
                }
                Err(e) if e.is_input_validation() => {
                    tracing::warn!(%input, error = %e, "spotlight.profile.invalid_input");
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!(%input, error = %e, "spotlight.profile.failed");
                    Vec::new()
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    per_profile.into_iter().flatten().collect()
}
