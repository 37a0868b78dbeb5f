//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.review-metrics.toml` files.

use crate::error::MetricsError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".review-metrics.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Collection identifiers.
    #[serde(default)]
    pub tables: TablesConfig,

    /// Response settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Scan chat logs to completion before starting on feedback logs.
    #[serde(default)]
    pub sequential: bool,
}

/// Which store the collections live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// DynamoDB tables (default)
    #[default]
    Dynamodb,
    /// Local JSON array files
    Json,
}

/// Data source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Store backend.
    #[serde(default)]
    pub backend: Backend,

    /// AWS region override. Falls back to the standard AWS environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override, e.g. a DynamoDB Local instance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    /// Items per page. Bounds each request, never the page count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// Collection identifiers and key fields.
///
/// Identifiers are table names for DynamoDB and file paths for JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesConfig {
    /// Chat log collection identifier.
    #[serde(default)]
    pub chat_logs: Option<String>,

    /// Feedback log collection identifier.
    #[serde(default)]
    pub feedback: Option<String>,

    /// Identifying key requested from chat logs.
    #[serde(default = "default_chat_logs_key")]
    pub chat_logs_key: String,

    /// Identifying key requested from feedback logs.
    #[serde(default = "default_feedback_key")]
    pub feedback_key: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            chat_logs: None,
            feedback: None,
            chat_logs_key: default_chat_logs_key(),
            feedback_key: default_feedback_key(),
        }
    }
}

fn default_chat_logs_key() -> String {
    "log_id".to_string()
}

fn default_feedback_key() -> String {
    "id".to_string()
}

/// Both collection identifiers, known to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTables {
    pub chat_logs: String,
    pub feedback: String,
}

impl TablesConfig {
    /// Check that both identifiers are set.
    ///
    /// Blank values count as missing.
    pub fn resolve(&self) -> Result<ResolvedTables, MetricsError> {
        fn required(value: &Option<String>, what: &str, env: &str) -> Result<String, MetricsError> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => Err(MetricsError::Config(format!(
                    "Missing required {} identifier (set {} or tables.{})",
                    what,
                    env,
                    env.to_lowercase().trim_end_matches("_table")
                ))),
            }
        }

        Ok(ResolvedTables {
            chat_logs: required(&self.chat_logs, "chat logs", "CHAT_LOGS_TABLE")?,
            feedback: required(&self.feedback, "feedback", "FEEDBACK_TABLE")?,
        })
    }
}

/// Response settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Add reviewed percentages to the success body.
    #[serde(default)]
    pub include_percentages: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Build the effective configuration for a run.
    ///
    /// Loads `--config` if given, else the default file when it exists, and
    /// merges the CLI arguments on top. A file that exists but cannot be read
    /// or parsed is a configuration error, never a silent fallback.
    pub fn from_args(args: &crate::cli::Args) -> Result<Self, MetricsError> {
        Self::from_args_with_default(args, Path::new(DEFAULT_CONFIG_FILE))
    }

    fn from_args_with_default(
        args: &crate::cli::Args,
        default_path: &Path,
    ) -> Result<Self, MetricsError> {
        let path = match args.config {
            Some(ref path) => Some(path.as_path()),
            None if default_path.exists() => Some(default_path),
            None => None,
        };

        let mut config = match path {
            Some(path) => {
                Self::load(path).map_err(|e| MetricsError::Config(format!("{:#}", e)))?
            }
            None => Config::default(),
        };

        config.merge_with_args(args);
        Ok(config)
    }

    /// Check values that may come from either the file or the CLI.
    pub fn validate(&self) -> Result<(), MetricsError> {
        if self.source.page_size == Some(0) {
            return Err(MetricsError::Config(
                "source.page_size must be at least 1".to_string(),
            ));
        }

        if let Some(ref url) = self.source.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(MetricsError::Config(format!(
                    "source.endpoint_url must start with 'http://' or 'https://': {}",
                    url
                )));
            }
        }

        for (name, value) in [
            ("tables.chat_logs_key", &self.tables.chat_logs_key),
            ("tables.feedback_key", &self.tables.feedback_key),
        ] {
            if value.trim().is_empty() {
                return Err(MetricsError::Config(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (including their environment variable fallbacks) take
    /// precedence over config file settings when provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref table) = args.chat_logs_table {
            self.tables.chat_logs = Some(table.clone());
        }
        if let Some(ref table) = args.feedback_table {
            self.tables.feedback = Some(table.clone());
        }
        if let Some(ref key) = args.chat_logs_key {
            self.tables.chat_logs_key = key.clone();
        }
        if let Some(ref key) = args.feedback_key {
            self.tables.feedback_key = key.clone();
        }

        if let Some(backend) = args.backend {
            self.source.backend = backend;
        }
        if let Some(ref region) = args.region {
            self.source.region = Some(region.clone());
        }
        if let Some(ref url) = args.endpoint_url {
            self.source.endpoint_url = Some(url.clone());
        }
        if let Some(page_size) = args.page_size {
            self.source.page_size = Some(page_size);
        }

        // Flags always override
        if args.sequential {
            self.general.sequential = true;
        }
        if args.percentages {
            self.report.include_percentages = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.tables.chat_logs = Some("UnityAIAssistantLogs".to_string());
        config.tables.feedback = Some("userFeedback".to_string());
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
