//! CLI entry point: `regexplain <input> <output> [--config config.json]`.
//!
//! Every failure — including fatal ones — is logged and the process still
//! exits with status 0, preserving the contract of the tool this replaces.
//! Callers must read the log stream to distinguish a clean run from one that
//! wrote sentinel explanations.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use regexplain::config;
use regexplain::openai::AzureOpenAiClient;
use regexplain::pipeline::runner;
use regexplain::store;

#[derive(Parser, Debug)]
#[command(
    name = "regexplain",
    version,
    about = "Annotates a translation-pattern file with model-generated regex explanations"
)]
struct Cli {
    /// Tab-separated UTF-16 pattern file to annotate.
    input: PathBuf,

    /// Destination for the annotated file.
    output: PathBuf,

    /// Configuration file with Azure OpenAI credentials.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Override the configured records-per-request batch size.
    #[arg(long)]
    batch_size: Option<usize>,
}

#[derive(thiserror::Error, Debug)]
enum RunError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Pattern file error: {0}")]
    Store(#[from] store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Run failed");
    }
}

fn run(cli: &Cli) -> Result<(), RunError> {
    let config = config::load(&cli.config)?;
    config::ensure_directories_exist(&config)?;

    let mut records = store::parse(&cli.input)?;
    let stats = store::stats(&records);
    tracing::info!(
        total_patterns = stats.total_patterns,
        unique_flags = stats.unique_flags,
        "Parsed pattern file"
    );

    let client = AzureOpenAiClient::new(&config);
    let batch_size = cli.batch_size.unwrap_or(config.batch_size).max(1);

    let report = runner::annotate_records(&mut records, &client, batch_size);
    tracing::info!(
        batches = report.batches_total,
        aligned = report.batches_aligned,
        failed_completion = report.batches_failed_completion,
        failed_alignment = report.batches_failed_alignment,
        annotated = report.records_annotated,
        "Annotation run complete"
    );

    store::save(&records, &cli.output)?;
    tracing::info!(path = %cli.output.display(), "Annotated file saved");

    Ok(())
}
