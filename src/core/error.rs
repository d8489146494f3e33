/// Error taxonomy for analysis calls

use thiserror::Error;

/// Fatal analysis failures surfaced to the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Insufficient data: at least one observation is required")]
    InsufficientData,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Failures talking to the remote forecasting service.
///
/// Never propagated out of the forecast aggregator: every variant degrades
/// to the rule-based projection and is recorded in the result's `method`.
#[derive(Error, Debug)]
pub enum ForecastServiceError {
    #[error("Forecast service request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Forecast service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Forecast service returned an unusable payload: {0}")]
    Malformed(String),
}
