//! Domain-specific error types for venture-lens

use thiserror::Error;

/// Which gateway operation was being attempted when an assessment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentOperation {
    AssessBusinessModel,
    ValidateMetrics,
}

impl AssessmentOperation {
    /// Fixed, caller-facing failure text for this operation.
    pub fn failure_message(self) -> &'static str {
        match self {
            AssessmentOperation::AssessBusinessModel => "Failed to assess business model",
            AssessmentOperation::ValidateMetrics => "Failed to validate metrics",
        }
    }
}

impl std::fmt::Display for AssessmentOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.failure_message())
    }
}

/// Main error type for venture-lens
#[derive(Error, Debug)]
pub enum VentureLensError {
    /// The only error an assessment caller ever sees. The underlying cause is
    /// logged at the gateway boundary and dropped.
    #[error("{operation}")]
    AssessmentFailed { operation: AssessmentOperation },

    #[error("Unsupported stage: {stage}")]
    UnsupportedStage { stage: String },

    #[error("Invalid inputs. Required fields: {}", required.join(", "))]
    InvalidInputs { required: Vec<String> },

    #[error("Valuation error: {message}")]
    Valuation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl VentureLensError {
    pub fn assessment_failed(operation: AssessmentOperation) -> Self {
        VentureLensError::AssessmentFailed { operation }
    }
}

impl From<serde_json::Error> for VentureLensError {
    fn from(err: serde_json::Error) -> Self {
        VentureLensError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for venture-lens operations
pub type Result<T> = std::result::Result<T, VentureLensError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_failure_message_is_fixed_per_operation() {
        let err = VentureLensError::assessment_failed(AssessmentOperation::AssessBusinessModel);
        assert_eq!(err.to_string(), "Failed to assess business model");

        let err = VentureLensError::assessment_failed(AssessmentOperation::ValidateMetrics);
        assert_eq!(err.to_string(), "Failed to validate metrics");
    }

    #[test]
    fn invalid_inputs_lists_required_fields() {
        let err = VentureLensError::InvalidInputs {
            required: vec!["mrr".into(), "churn".into()],
        };
        assert_eq!(err.to_string(), "Invalid inputs. Required fields: mrr, churn");
    }
}
