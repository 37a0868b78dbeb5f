//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::Backend;
use clap::Parser;
use std::path::PathBuf;

/// Review Metrics - review-completion counts for chat and feedback logs
///
/// Scans the chat log and feedback log collections in full and reports
/// how many entries are reviewed and how many are still pending.
///
/// Examples:
///   review-metrics --chat-logs-table UnityAIAssistantLogs --feedback-table userFeedback
///   CHAT_LOGS_TABLE=logs FEEDBACK_TABLE=feedback review-metrics --format text
///   review-metrics --backend json --chat-logs-table chat.json --feedback-table feedback.json
///   review-metrics --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Chat log collection (table name, or file path with --backend json)
    #[arg(long, value_name = "TABLE", env = "CHAT_LOGS_TABLE")]
    pub chat_logs_table: Option<String>,

    /// Feedback log collection (table name, or file path with --backend json)
    #[arg(long, value_name = "TABLE", env = "FEEDBACK_TABLE")]
    pub feedback_table: Option<String>,

    /// Identifying key requested from chat logs [default: log_id]
    #[arg(long, value_name = "FIELD")]
    pub chat_logs_key: Option<String>,

    /// Identifying key requested from feedback logs [default: id]
    #[arg(long, value_name = "FIELD")]
    pub feedback_key: Option<String>,

    /// Where the collections are stored
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<Backend>,

    /// AWS region to use instead of the environment's default
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Custom DynamoDB endpoint (e.g. http://localhost:8000 for DynamoDB Local)
    #[arg(long, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Items requested per page
    ///
    /// Only bounds the size of each request; every page is still read.
    #[arg(long, value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Scan the two collections one after the other instead of concurrently
    #[arg(long)]
    pub sequential: bool,

    /// Include reviewed percentages in the response body
    #[arg(long)]
    pub percentages: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .review-metrics.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "envelope", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the response to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .review-metrics.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `{statusCode, body}` JSON, as returned to an API gateway (default)
    #[default]
    Envelope,
    /// Response body JSON only
    Json,
    /// Human-readable summary
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.page_size == Some(0) {
            return Err("Page size must be at least 1".to_string());
        }

        if let Some(ref url) = self.endpoint_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        for key in [&self.chat_logs_key, &self.feedback_key].into_iter().flatten() {
            if key.trim().is_empty() {
                return Err("Key field names cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is the config file's `general.verbose`; `--quiet`
    /// still wins over it.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
