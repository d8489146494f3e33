/// Forecast aggregation
///
/// Two-branch strategy selection: a single bounded attempt against the
/// remote quantile model when history is deep enough, composed with the
/// always-available rule-based projection. Remote failure is data here, not
/// an error; it degrades the method annotation, never the call.

pub mod ml_client;
pub mod rule_based;

pub use ml_client::{MlForecastClient, MlForecastResponse, MlPrediction};

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::config::{Config, ForecastPolicy};
use crate::core::{
    ConfidenceLevel, ForecastData, ForecastMethod, ForecastPoint, Momentum, Observation,
    TrendDirection,
};
use crate::features::Features;

/// Relative tolerance before first-vs-last movement counts as a trend.
const TREND_TOLERANCE: f64 = 0.05;

/// Forecast plus the rule-vs-remote agreement (absent on the fallback path).
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub data: ForecastData,
    pub model_agreement: Option<f64>,
}

pub struct ForecastAggregator {
    client: MlForecastClient,
    policy: ForecastPolicy,
}

impl ForecastAggregator {
    pub fn new(config: &Config) -> Self {
        Self {
            client: MlForecastClient::new(
                &config.forecast.service_url,
                Duration::from_secs(config.forecast.request_timeout_secs),
            ),
            policy: config.forecast.clone(),
        }
    }

    pub async fn forecast(
        &self,
        product_id: &str,
        history: &[Observation],
        features: &Features,
        momentum: &Momentum,
    ) -> ForecastOutcome {
        let horizon = self.policy.horizon_days;
        let rule = rule_based::project(history, features, momentum.combined, horizon);

        if history.len() >= self.policy.min_history_for_ml {
            match self.client.fetch_forecast(product_id, horizon).await {
                Ok(response) => {
                    if let Some((predictions, agreement)) =
                        blend_with_remote(&rule, &response.predictions, history.len())
                    {
                        debug!(
                            "Blended remote forecast for {} (agreement {:.2})",
                            product_id, agreement
                        );
                        return ForecastOutcome {
                            data: assemble(predictions, ForecastMethod::Ml, history.len(), horizon),
                            model_agreement: Some(agreement),
                        };
                    }
                    warn!(
                        "Forecast service response for {} shares no dates with the projection horizon; falling back",
                        product_id
                    );
                }
                Err(e) => {
                    warn!(
                        "Forecast service unavailable for {}: {}; falling back to rule-based projection",
                        product_id, e
                    );
                }
            }
        }

        ForecastOutcome {
            data: assemble(
                rule,
                ForecastMethod::RuleBasedFallback,
                history.len(),
                horizon,
            ),
            model_agreement: None,
        }
    }
}

/// Blend weights between the rule curve and the remote median, keyed on how
/// much history exists and how well the two already agree.
fn adaptive_weights(history_len: usize, agreement: f64) -> (f64, f64) {
    if history_len < 60 {
        (0.7, 0.3)
    } else if history_len > 90 && agreement >= 0.8 {
        (0.3, 0.7)
    } else {
        (0.5, 0.5)
    }
}

/// Merge the remote predictions into the rule curve date by date.
///
/// Returns `None` when the remote response shares no dates with the horizon,
/// in which case the caller treats the payload as unusable. Dates the remote
/// side skipped keep their rule-based point untouched.
fn blend_with_remote(
    rule: &[ForecastPoint],
    remote: &[MlPrediction],
    history_len: usize,
) -> Option<(Vec<ForecastPoint>, f64)> {
    let remote_by_date: HashMap<NaiveDate, &MlPrediction> =
        remote.iter().map(|p| (p.date, p)).collect();

    let mut per_date_agreement = Vec::new();
    for point in rule {
        if let Some(estimate) = remote_by_date
            .get(&point.date)
            .and_then(|p| p.point_estimate())
        {
            let diff = (point.predicted_quantity - estimate).abs();
            per_date_agreement.push(1.0 - (diff / estimate.max(1.0)).min(1.0));
        }
    }
    if per_date_agreement.is_empty() {
        return None;
    }
    let agreement = per_date_agreement.iter().sum::<f64>() / per_date_agreement.len() as f64;
    let (weight_rule, weight_ml) = adaptive_weights(history_len, agreement);

    let predictions = rule
        .iter()
        .map(|point| {
            let Some(prediction) = remote_by_date.get(&point.date) else {
                return point.clone();
            };
            let Some(estimate) = prediction.point_estimate() else {
                return point.clone();
            };

            let blended = weight_rule * point.predicted_quantity + weight_ml * estimate;
            let lower = prediction
                .lower_bound
                .map(|p10| p10.min(blended))
                .or(point.lower_bound);
            let upper = prediction
                .upper_bound
                .map(|p90| p90.max(blended))
                .or(point.upper_bound);

            let confidence = match (prediction.lower_bound, prediction.upper_bound) {
                (Some(p10), Some(p90)) => confidence_from_bounds(p10, p90, blended),
                _ => prediction
                    .confidence
                    .as_deref()
                    .and_then(parse_confidence)
                    .unwrap_or(ConfidenceLevel::Medium),
            };

            ForecastPoint {
                date: point.date,
                predicted_quantity: blended,
                confidence,
                lower_bound: lower,
                upper_bound: upper,
                ml_p50: Some(estimate),
            }
        })
        .collect();

    Some((predictions, agreement))
}

/// Confidence from the quantile spread relative to the point estimate.
fn confidence_from_bounds(lower: f64, upper: f64, value: f64) -> ConfidenceLevel {
    let width = (upper - lower).max(0.0);
    let ratio = width / value.abs().max(1.0);
    if ratio < 0.2 {
        ConfidenceLevel::High
    } else if ratio < 0.4 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

fn parse_confidence(label: &str) -> Option<ConfidenceLevel> {
    match label.to_ascii_uppercase().as_str() {
        "HIGH" => Some(ConfidenceLevel::High),
        "MEDIUM" => Some(ConfidenceLevel::Medium),
        "LOW" => Some(ConfidenceLevel::Low),
        _ => None,
    }
}

fn assemble(
    predictions: Vec<ForecastPoint>,
    method: ForecastMethod,
    history_len: usize,
    horizon: usize,
) -> ForecastData {
    let trend = detect_trend(&predictions);
    let total_next_7_days: f64 = predictions
        .iter()
        .take(7)
        .map(|p| p.predicted_quantity)
        .sum();

    let summary = match method {
        ForecastMethod::Ml => format!(
            "ML forecast projects {:.0} units over the next {} days; trend {}.",
            total_next_7_days, horizon, trend
        ),
        ForecastMethod::RuleBasedFallback if history_len >= 30 => format!(
            "Rule-based projection of {:.0} units over the next {} days; trend {}. Forecasting service unavailable.",
            total_next_7_days, horizon, trend
        ),
        ForecastMethod::RuleBasedFallback => format!(
            "Rule-based projection of {:.0} units over the next {} days; trend {}. Limited sales history ({} of 30 days recommended); treat this projection as low confidence.",
            total_next_7_days, horizon, trend, history_len
        ),
    };

    ForecastData {
        predictions,
        trend,
        method,
        total_next_7_days,
        summary,
    }
}

fn detect_trend(predictions: &[ForecastPoint]) -> TrendDirection {
    let (Some(first), Some(last)) = (predictions.first(), predictions.last()) else {
        return TrendDirection::Stable;
    };
    if last.predicted_quantity > first.predicted_quantity * (1.0 + TREND_TOLERANCE) {
        TrendDirection::Increasing
    } else if last.predicted_quantity < first.predicted_quantity * (1.0 - TREND_TOLERANCE) {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::compute_features;
    use chrono::Duration as ChronoDuration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule_point(date: NaiveDate, quantity: f64) -> ForecastPoint {
        ForecastPoint {
            date,
            predicted_quantity: quantity,
            confidence: ConfidenceLevel::Low,
            lower_bound: Some(quantity - 2.0),
            upper_bound: Some(quantity + 2.0),
            ml_p50: None,
        }
    }

    fn remote_point(date: NaiveDate, p50: f64) -> MlPrediction {
        serde_json::from_value(serde_json::json!({
            "date": date.to_string(),
            "ml_p50": p50,
            "lower_bound": p50 - 1.0,
            "upper_bound": p50 + 1.0,
        }))
        .unwrap()
    }

    #[test]
    fn adaptive_weights_follow_the_history_table() {
        assert_eq!(adaptive_weights(30, 0.9), (0.7, 0.3));
        assert_eq!(adaptive_weights(75, 0.9), (0.5, 0.5));
        assert_eq!(adaptive_weights(120, 0.9), (0.3, 0.7));
        // Deep history but poor agreement stays balanced
        assert_eq!(adaptive_weights(120, 0.5), (0.5, 0.5));
    }

    #[test]
    fn perfect_remote_match_scores_full_agreement() {
        let d = date(2024, 4, 9);
        let rule = vec![rule_point(d, 10.0)];
        let remote = vec![remote_point(d, 10.0)];
        let (predictions, agreement) = blend_with_remote(&rule, &remote, 30).unwrap();
        assert!((agreement - 1.0).abs() < 1e-9);
        assert_eq!(predictions[0].predicted_quantity, 10.0);
        assert_eq!(predictions[0].ml_p50, Some(10.0));
    }

    #[test]
    fn blend_sits_between_rule_and_remote() {
        let d = date(2024, 4, 9);
        let rule = vec![rule_point(d, 10.0)];
        let remote = vec![remote_point(d, 20.0)];
        let (predictions, _) = blend_with_remote(&rule, &remote, 30).unwrap();
        let blended = predictions[0].predicted_quantity;
        assert!(blended > 10.0 && blended < 20.0);
        // <60 days of history leans on the rule curve
        assert!((blended - 13.0).abs() < 1e-9);
    }

    #[test]
    fn dates_missing_from_remote_keep_the_rule_point() {
        let rule = vec![
            rule_point(date(2024, 4, 9), 10.0),
            rule_point(date(2024, 4, 10), 11.0),
        ];
        let remote = vec![remote_point(date(2024, 4, 9), 10.0)];
        let (predictions, _) = blend_with_remote(&rule, &remote, 30).unwrap();
        assert_eq!(predictions[1].ml_p50, None);
        assert_eq!(predictions[1].predicted_quantity, 11.0);
    }

    #[test]
    fn disjoint_remote_dates_are_unusable() {
        let rule = vec![rule_point(date(2024, 4, 9), 10.0)];
        let remote = vec![remote_point(date(2024, 5, 1), 10.0)];
        assert!(blend_with_remote(&rule, &remote, 30).is_none());
    }

    #[test]
    fn quantile_width_drives_confidence() {
        assert_eq!(confidence_from_bounds(9.5, 10.5, 10.0), ConfidenceLevel::High);
        assert_eq!(
            confidence_from_bounds(8.5, 11.5, 10.0),
            ConfidenceLevel::Medium
        );
        assert_eq!(confidence_from_bounds(5.0, 15.0, 10.0), ConfidenceLevel::Low);
    }

    #[test]
    fn trend_detection_uses_the_relative_tolerance() {
        let increasing = vec![rule_point(date(2024, 4, 9), 10.0), rule_point(date(2024, 4, 15), 11.0)];
        let decreasing = vec![rule_point(date(2024, 4, 9), 10.0), rule_point(date(2024, 4, 15), 9.0)];
        let flat = vec![rule_point(date(2024, 4, 9), 10.0), rule_point(date(2024, 4, 15), 10.3)];
        assert_eq!(detect_trend(&increasing), TrendDirection::Increasing);
        assert_eq!(detect_trend(&decreasing), TrendDirection::Decreasing);
        assert_eq!(detect_trend(&flat), TrendDirection::Stable);
    }

    #[test]
    fn short_history_summary_carries_the_caveat() {
        let points = vec![rule_point(date(2024, 4, 9), 10.0)];
        let data = assemble(points, ForecastMethod::RuleBasedFallback, 5, 7);
        assert!(data.summary.contains("Limited sales history"));
        assert!(data.summary.contains("5 of 30 days"));
    }

    #[tokio::test]
    async fn unreachable_service_degrades_to_fallback() {
        let mut config = Config::default();
        config.forecast.service_url = "http://127.0.0.1:9".to_string();
        config.forecast.request_timeout_secs = 1;

        let start = date(2024, 3, 10);
        let history: Vec<Observation> = (0..30)
            .map(|i| Observation::new(start + ChronoDuration::days(i), 10.0))
            .collect();
        let features = compute_features(&history, &config).unwrap();
        let momentum = crate::momentum::classify(&features, &config.momentum);

        let aggregator = ForecastAggregator::new(&config);
        let outcome = aggregator
            .forecast("sku-1", &history, &features, &momentum)
            .await;

        assert_eq!(outcome.data.method, ForecastMethod::RuleBasedFallback);
        assert_eq!(outcome.data.predictions.len(), 7);
        assert_eq!(outcome.model_agreement, None);
    }
}
