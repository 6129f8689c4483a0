/*!
 * Application configuration module.
 *
 * Handles loading, validating and defaulting configuration settings. The
 * API credential is validated once at startup; the engine never re-checks
 * it per call.
 */

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Model backend provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Consensus engine settings
    #[serde(default)]
    pub consensus: ConsensusConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Configuration for the model backend (OpenRouter-compatible API)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// API key for the backend; may also come from the OPENROUTER_API_KEY env var
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Configuration for the consensus engine
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConsensusConfig {
    /// Models fanned out to for forward/backward translation rounds
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Model used for single-shot source language detection
    #[serde(default = "default_detection_model")]
    pub detection_model: String,

    /// Vision-capable model used for image text extraction
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,
}

/// Configuration for the HTTP server
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8000"
    #[serde(default = "default_bind")]
    pub bind: String,
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_models() -> Vec<String> {
    vec![
        "openai/gpt-4-turbo".to_string(),
        "anthropic/claude-3.5-sonnet".to_string(),
        "deepseek/deepseek-chat".to_string(),
        "google/gemini-2.5-pro".to_string(),
    ]
}

fn default_detection_model() -> String {
    "openai/gpt-4-turbo".to_string()
}

fn default_extraction_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            detection_model: default_detection_model(),
            extraction_model: default_extraction_model(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            consensus: ConsensusConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| anyhow!("Failed to open config file {}: {}", path.as_ref().display(), e))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Load configuration from a file if it exists, otherwise use defaults
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Fill the API key from the environment when the file did not provide one
    pub fn with_env_overrides(mut self) -> Self {
        if self.provider.api_key.is_empty() {
            if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
                self.provider.api_key = key;
            }
        }
        self
    }

    /// Validate the configuration, called once at startup
    pub fn validate(&self) -> Result<()> {
        if self.provider.api_key.trim().is_empty() {
            return Err(anyhow!(
                "Missing API key: set provider.api_key in the config file or the OPENROUTER_API_KEY environment variable"
            ));
        }

        Url::parse(&self.provider.endpoint)
            .map_err(|e| anyhow!("Invalid provider endpoint {}: {}", self.provider.endpoint, e))?;

        if self.consensus.models.is_empty() {
            return Err(anyhow!("At least one consensus model must be configured"));
        }

        if self.provider.timeout_secs == 0 {
            return Err(anyhow!("provider.timeout_secs must be greater than zero"));
        }

        Ok(())
    }
}
