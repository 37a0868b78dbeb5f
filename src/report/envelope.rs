//! Response envelope returned by a metrics invocation.
//!
//! Success and failure both use the same `{statusCode, body}` shape; the
//! body is itself a JSON document, serialized as a string.

use crate::error::MetricsError;
use crate::models::ReviewMetrics;
use serde::{Deserialize, Serialize};

/// Status marker for a successful invocation.
pub const STATUS_OK: u16 = 200;

/// Status marker for any failed invocation.
pub const STATUS_ERROR: u16 = 500;

/// Error label for missing collection identifiers.
pub const CONFIG_ERROR: &str = "Configuration error";

/// Error label for every other failure.
pub const METRICS_ERROR: &str = "Failed to calculate metrics";

/// Success body: six counts, plus optional percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBody {
    pub total_chat_logs: usize,
    pub reviewed_chat_logs: usize,
    pub pending_chat_logs: usize,
    pub total_feedback_logs: usize,
    pub reviewed_feedback_logs: usize,
    pub pending_feedback_logs: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_logs_reviewed_percentage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_logs_reviewed_percentage: Option<u32>,
}

impl MetricsBody {
    /// Flatten both collections' counts into the body layout.
    pub fn new(metrics: &ReviewMetrics, include_percentages: bool) -> Self {
        let chat = metrics.chat_logs;
        let feedback = metrics.feedback_logs;

        Self {
            total_chat_logs: chat.total,
            reviewed_chat_logs: chat.reviewed,
            pending_chat_logs: chat.pending,
            total_feedback_logs: feedback.total,
            reviewed_feedback_logs: feedback.reviewed,
            pending_feedback_logs: feedback.pending,
            chat_logs_reviewed_percentage: include_percentages
                .then(|| chat.reviewed_percentage()),
            feedback_logs_reviewed_percentage: include_percentages
                .then(|| feedback.reviewed_percentage()),
        }
    }
}

/// Failure body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&MetricsError> for ErrorBody {
    fn from(err: &MetricsError) -> Self {
        let error = if err.is_config() {
            CONFIG_ERROR
        } else {
            METRICS_ERROR
        };

        Self {
            error: error.to_string(),
            message: err.to_string(),
        }
    }
}

/// Gateway-style response: status marker plus serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: String,
}

impl Response {
    /// 200 response carrying the metrics body.
    pub fn ok(body: &MetricsBody) -> Self {
        Self::with_body(STATUS_OK, body)
    }

    /// 500 response carrying the error classification.
    pub fn error(err: &MetricsError) -> Self {
        Self::with_body(STATUS_ERROR, &ErrorBody::from(err))
    }

    fn with_body<T: Serialize>(status_code: u16, body: &T) -> Self {
        // Plain structs of strings and integers always serialize.
        let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
        Self { status_code, body }
    }

    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricsResult;
    use serde_json::Value;

    fn sample_metrics() -> ReviewMetrics {
        ReviewMetrics {
            chat_logs: MetricsResult {
                total: 4,
                reviewed: 2,
                pending: 2,
            },
            feedback_logs: MetricsResult {
                total: 3,
                reviewed: 1,
                pending: 2,
            },
        }
    }

    #[test]
    fn test_success_body_has_six_fields() {
        let response = Response::ok(&MetricsBody::new(&sample_metrics(), false));
        assert_eq!(response.status_code, 200);
        assert!(response.is_success());

        let body: Value = serde_json::from_str(&response.body).unwrap();
        let object = body.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert_eq!(body["totalChatLogs"], 4);
        assert_eq!(body["reviewedChatLogs"], 2);
        assert_eq!(body["pendingChatLogs"], 2);
        assert_eq!(body["totalFeedbackLogs"], 3);
        assert_eq!(body["reviewedFeedbackLogs"], 1);
        assert_eq!(body["pendingFeedbackLogs"], 2);
    }

    #[test]
    fn test_success_body_with_percentages() {
        let body = MetricsBody::new(&sample_metrics(), true);
        let json: Value = serde_json::to_value(&body).unwrap();

        assert_eq!(json["chatLogsReviewedPercentage"], 50);
        assert_eq!(json["feedbackLogsReviewedPercentage"], 33);
    }

    #[test]
    fn test_config_error_response() {
        let err = MetricsError::Config("Missing required chat logs identifier".to_string());
        let response = Response::error(&err);

        assert_eq!(response.status_code, 500);
        let body: ErrorBody = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body.error, "Configuration error");
        assert_eq!(body.message, "Missing required chat logs identifier");
    }

    #[test]
    fn test_scan_error_response() {
        let err = MetricsError::scan("userFeedback", anyhow::anyhow!("AccessDeniedException"));
        let response = Response::error(&err);

        assert!(!response.is_success());
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], "Failed to calculate metrics");
        assert!(body["message"].as_str().unwrap().contains("AccessDeniedException"));
        assert!(body.get("totalChatLogs").is_none());
    }

    #[test]
    fn test_envelope_serialization() {
        let response = Response {
            status_code: 200,
            body: "{}".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"statusCode":200,"body":"{}"}"#);
    }
}
