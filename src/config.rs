//! Runtime configuration, loaded from a JSON file.
//!
//! Credentials and deployment settings live in `config.json` next to the
//! binary. The loaded value is threaded explicitly into client construction
//! rather than held as ambient state.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::batch::DEFAULT_BATCH_SIZE;

/// Application-level constants
pub const APP_NAME: &str = "regexplain";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "regexplain=info"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error loading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error loading configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for one annotation run.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Azure OpenAI API key.
    pub azure_openai_key: String,
    /// API version query parameter, e.g. "2024-02-01".
    pub azure_openai_api_version: String,
    /// Resource endpoint, e.g. "https://my-resource.openai.azure.com".
    pub azure_openai_endpoint: String,
    /// Chat-completion deployment name.
    pub azure_openai_deployment: String,
    /// Created at startup when set.
    #[serde(default)]
    pub input_directory: Option<String>,
    /// Created at startup when set.
    #[serde(default)]
    pub output_directory: Option<String>,
    /// Records per completion request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Completion token budget per request.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_tokens() -> u32 {
    1000
}

/// Load configuration from a JSON file.
pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Create the configured input/output directories if they are missing.
pub fn ensure_directories_exist(config: &AppConfig) -> std::io::Result<()> {
    for dir in [&config.input_directory, &config.output_directory]
        .into_iter()
        .flatten()
    {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
