/// HTTP client for the external quantile-forecasting service

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ForecastServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct MlForecastRequest<'a> {
    #[serde(rename = "productId")]
    pub product_id: &'a str,
    #[serde(rename = "horizonDays")]
    pub horizon_days: usize,
}

/// Remote response. Every numeric field is optional; the service is free to
/// omit any subset and the aggregator must cope.
#[derive(Debug, Clone, Deserialize)]
pub struct MlForecastResponse {
    #[serde(default)]
    pub predictions: Vec<MlPrediction>,
    #[serde(default)]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MlPrediction {
    pub date: NaiveDate,
    #[serde(default)]
    pub predicted_quantity: Option<f64>,
    #[serde(default)]
    pub ml_p50: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
}

impl MlPrediction {
    /// Median point estimate, whichever field the service populated.
    pub fn point_estimate(&self) -> Option<f64> {
        self.ml_p50.or(self.predicted_quantity)
    }
}

pub struct MlForecastClient {
    client: Client,
    base_url: String,
}

impl MlForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create forecast HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Single attempt, no retries: the rule-based projection is always
    /// available, so a failed call falls straight through to it.
    pub async fn fetch_forecast(
        &self,
        product_id: &str,
        horizon_days: usize,
    ) -> Result<MlForecastResponse, ForecastServiceError> {
        let url = format!("{}/api/ml/forecast", self.base_url);
        debug!("Requesting ML forecast for {} from {}", product_id, url);

        let response = self
            .client
            .post(&url)
            .json(&MlForecastRequest {
                product_id,
                horizon_days,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ForecastServiceError::Status(response.status()));
        }

        let data: MlForecastResponse = response
            .json()
            .await
            .map_err(|e| ForecastServiceError::Malformed(e.to_string()))?;

        if data.predictions.is_empty() {
            return Err(ForecastServiceError::Malformed(
                "empty predictions array".to_string(),
            ));
        }

        Ok(data)
    }
}
