//! Error types shared by the aggregator and the predictor.

use thiserror::Error;

/// Errors produced by the core services.
///
/// Only two kinds exist from a caller's point of view: the caller supplied
/// nothing usable (`EmptyInput`), or the computation failed for some other
/// reason (`ProcessingFailed` / `PredictionFailed`, one per service).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The input had no usable data.
    #[error("{0}")]
    EmptyInput(String),

    /// The aggregator could not summarize the payload.
    #[error("Data processing failed: {0}")]
    ProcessingFailed(String),

    /// The predictor could not score the features.
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl ServiceError {
    pub fn empty(message: impl Into<String>) -> Self {
        ServiceError::EmptyInput(message.into())
    }

    pub fn processing(message: impl Into<String>) -> Self {
        ServiceError::ProcessingFailed(message.into())
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        ServiceError::PredictionFailed(message.into())
    }

    /// Returns true if the error means the caller sent no data.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, ServiceError::EmptyInput(_))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ServiceError::empty("No numbers provided").to_string(),
            "No numbers provided"
        );
        assert_eq!(
            ServiceError::processing("bad shape").to_string(),
            "Data processing failed: bad shape"
        );
        assert_eq!(
            ServiceError::prediction("nan").to_string(),
            "Prediction failed: nan"
        );
    }

    #[test]
    fn test_is_empty_input() {
        assert!(ServiceError::empty("x").is_empty_input());
        assert!(!ServiceError::processing("x").is_empty_input());
    }
}
