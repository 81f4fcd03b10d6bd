//! Configuration management for the term deposit predictor

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

/// Locations of the externally produced artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Trained classifier (`.json` logistic model or `.onnx` graph)
    pub model_path: PathBuf,
    /// Ordered feature-name list the classifier was trained on
    pub feature_names_path: PathBuf,
    /// Intra-op threads for the ONNX session
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("final_model.json"),
            feature_names_path: PathBuf::from("feature_names.json"),
            onnx_threads: 1,
        }
    }
}

/// Periodic metrics summary
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Seconds between summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            report_interval_secs: 300,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for this crate when RUST_LOG does not say otherwise
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::build(Path::new(DEFAULT_CONFIG_PATH), false)
    }

    /// Load configuration from a specific path, which must exist
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::build(path.as_ref(), true)
    }

    fn build(path: &Path, required: bool) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path).required(required))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
