use serde::{Deserialize, Serialize};
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::prober::Target;

const DEFAULT_COUNT: u32 = 3;
const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Parser, Debug, Default)]
#[command(name = "http-latency")]
#[command(about = "Measure HTTP response latency of one or more URLs")]
pub struct Cli {
    /// URLs to measure (http or https)
    pub urls: Vec<String>,

    /// Number of rounds
    #[arg(short = 'c', long = "count", value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Per-round timeout in milliseconds
    #[arg(short = 't', long = "timeout")]
    pub timeout_ms: Option<u64>,

    /// JSON config file
    #[arg(long, env = "TARGET_CONFIG")]
    pub config: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write Prometheus text metrics here after the run
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Exit non-zero if any request failed or timed out
    #[arg(long)]
    pub strict: bool,
}

/// On-disk form; every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub count: Option<u32>,
    pub timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub targets: Vec<String>,
    pub metrics_file: Option<PathBuf>,
    pub strict: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub targets: Vec<Target>,
    pub count: u32,
    pub timeout: Duration,
    pub log_level: String,
    pub metrics_file: Option<PathBuf>,
    pub strict: bool,
}

impl Config {
    pub async fn load(cli: Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file_config(path).await?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    /// Command line wins over the file, the file over built-in defaults.
    pub fn merge(cli: Cli, file: FileConfig) -> Result<Self> {
        let raw_targets = if cli.urls.is_empty() { file.targets } else { cli.urls };
        if raw_targets.is_empty() {
            bail!("not enough arguments: at least one url is required");
        }
        let targets = raw_targets
            .iter()
            .map(|raw| Target::parse(raw))
            .collect::<Result<Vec<_>>>()?;

        let count = cli.count.or(file.count).unwrap_or(DEFAULT_COUNT);
        if count == 0 {
            bail!("count must be at least 1");
        }

        let config = Self {
            targets,
            count,
            timeout: Duration::from_millis(cli.timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS)),
            log_level: cli.log_level.or(file.log_level).unwrap_or_else(default_log_level),
            metrics_file: cli.metrics_file.or(file.metrics_file),
            strict: cli.strict || file.strict,
        };
        config.validate_log_level()?;
        Ok(config)
    }

    /// Get the log level as a tracing::Level
    pub fn get_tracing_level(&self) -> Result<tracing::Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(tracing::Level::TRACE),
            "debug" => Ok(tracing::Level::DEBUG),
            "info" => Ok(tracing::Level::INFO),
            "warn" | "warning" => Ok(tracing::Level::WARN),
            "error" => Ok(tracing::Level::ERROR),
            _ => Err(anyhow::anyhow!("Invalid log level: {}. Valid levels are: trace, debug, info, warn, error", self.log_level))
        }
    }

    pub fn validate_log_level(&self) -> Result<()> {
        self.get_tracing_level().map(|_| ())
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

async fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config: FileConfig = serde_json::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}
