//! Output rendering.
//!
//! This module turns the outcome of an invocation into the text written to
//! stdout or the output file, in one of the supported formats.

use super::{ErrorBody, MetricsBody, Response};
use crate::cli::OutputFormat;
use crate::error::MetricsError;
use crate::models::{MetricsResult, ReviewMetrics};
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Outcome of one invocation: both collections' metrics, or the failure.
pub type Outcome = std::result::Result<ReviewMetrics, MetricsError>;

/// Build the gateway-style response for an outcome.
pub fn build_response(outcome: &Outcome, include_percentages: bool) -> Response {
    match outcome {
        Ok(metrics) => Response::ok(&MetricsBody::new(metrics, include_percentages)),
        Err(err) => Response::error(err),
    }
}

/// Render an outcome in the requested format.
pub fn render(
    outcome: &Outcome,
    format: OutputFormat,
    include_percentages: bool,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    match format {
        OutputFormat::Envelope => {
            let response = build_response(outcome, include_percentages);
            Ok(serde_json::to_string_pretty(&response)?)
        }
        OutputFormat::Json => match outcome {
            Ok(metrics) => Ok(serde_json::to_string_pretty(&MetricsBody::new(
                metrics,
                include_percentages,
            ))?),
            Err(err) => Ok(serde_json::to_string_pretty(&ErrorBody::from(err))?),
        },
        OutputFormat::Text => Ok(generate_text_report(outcome, generated_at)),
    }
}

/// Generate a human-readable summary.
pub fn generate_text_report(outcome: &Outcome, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str("Review Metrics\n");
    output.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    match outcome {
        Ok(metrics) => {
            output.push_str(&generate_collection_section("Chat logs", &metrics.chat_logs));
            output.push_str(&generate_collection_section(
                "Feedback logs",
                &metrics.feedback_logs,
            ));
        }
        Err(err) => {
            let body = ErrorBody::from(err);
            output.push_str(&format!("Error: {}\n", body.error));
            output.push_str(&format!("  {}\n", body.message));
        }
    }

    output
}

fn generate_collection_section(title: &str, result: &MetricsResult) -> String {
    let mut section = String::new();

    section.push_str(&format!("{}\n", title));
    section.push_str(&format!("  Total:    {}\n", result.total));
    section.push_str(&format!(
        "  Reviewed: {} ({}%)\n",
        result.reviewed,
        result.reviewed_percentage()
    ));
    section.push_str(&format!("  Pending:  {}\n\n", result.pending));

    section
}
