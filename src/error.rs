//! Error taxonomy for a metrics invocation.

use thiserror::Error;

/// Errors surfaced by a metrics invocation.
///
/// The two variants map onto the two user-visible failure responses, so
/// operators can tell a misconfigured deployment from a data-layer fault.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Required collection identifiers are missing.
    #[error("{0}")]
    Config(String),

    /// A source could not be opened or a page query failed.
    #[error("{collection}: {message}")]
    Scan {
        /// Collection being scanned when the failure happened.
        collection: String,
        /// Rendered cause chain.
        message: String,
        /// Underlying failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl MetricsError {
    /// Wrap a source failure for the named collection.
    pub fn scan(collection: impl Into<String>, source: anyhow::Error) -> Self {
        MetricsError::Scan {
            collection: collection.into(),
            message: format!("{:#}", source),
            source: source.into(),
        }
    }

    /// Whether this is a configuration failure.
    pub fn is_config(&self) -> bool {
        matches!(self, MetricsError::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_message() {
        let err = MetricsError::Config("Missing table identifier: chat logs".to_string());
        assert!(err.is_config());
        assert_eq!(err.to_string(), "Missing table identifier: chat logs");
    }

    #[test]
    fn test_scan_message_keeps_context() {
        let cause = anyhow::anyhow!("throttled").context("page 2 of chat logs failed");
        let err = MetricsError::scan("chat logs", cause);

        assert!(!err.is_config());
        let message = err.to_string();
        assert!(message.starts_with("chat logs: "));
        assert!(message.contains("page 2 of chat logs failed"));
        assert!(message.contains("throttled"));
    }
}
