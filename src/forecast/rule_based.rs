/// Rule-based demand projection
///
/// The fallback forecaster: expected baseline for each future date scaled by
/// the combined momentum ratio, with calendar adjustments and a smoothing
/// pass. Entirely deterministic; the day-to-day texture comes from a
/// date-seeded variation, not a random source.

use chrono::{Datelike, Duration, NaiveDate};

use crate::core::{ConfidenceLevel, ForecastPoint, Observation};
use crate::features::{is_midmonth_dip, Features};

/// Adaptive caps keyed on how much history backs the projection. Thin data
/// gets tighter weekday clamps and less day-to-day variation.
#[derive(Debug, Clone, Copy)]
struct DataTier {
    variation_scale: f64,
    dow_clamp: (f64, f64),
}

fn tier_for(data_len: usize) -> DataTier {
    if data_len >= 60 {
        DataTier {
            variation_scale: 1.0,
            dow_clamp: (0.80, 1.25),
        }
    } else if data_len >= 30 {
        DataTier {
            variation_scale: 0.8,
            dow_clamp: (0.85, 1.20),
        }
    } else if data_len >= 14 {
        DataTier {
            variation_scale: 0.6,
            dow_clamp: (0.88, 1.15),
        }
    } else if data_len >= 7 {
        DataTier {
            variation_scale: 0.4,
            dow_clamp: (0.92, 1.10),
        }
    } else {
        DataTier {
            variation_scale: 0.2,
            dow_clamp: (0.95, 1.05),
        }
    }
}

/// Project `horizon_days` of demand past the end of the history.
///
/// Caller guarantees a non-empty history (enforced upstream when features
/// are computed).
pub fn project(
    history: &[Observation],
    features: &Features,
    combined_momentum: f64,
    horizon_days: usize,
) -> Vec<ForecastPoint> {
    let Some(last) = history.last() else {
        return Vec::new();
    };
    let tier = tier_for(history.len());
    let last_date = last.date;
    let std_dev = recent_std(history);

    let mut predictions = Vec::with_capacity(horizon_days);
    let mut prev_predicted: Option<f64> = None;

    for offset in 1..=horizon_days {
        let date = last_date + Duration::days(offset as i64);

        let mut predicted =
            features.baseline_with_dow_clamp(date, Some(tier.dow_clamp)) * combined_momentum;

        if is_midmonth_dip(date, features.rules()) {
            predicted *= 1.0 - 0.05 * tier.variation_scale;
        }

        predicted *= date_variation(date, tier.variation_scale);

        // Cap day-over-day swings; thin data gets the strictest cap
        let max_change = 0.15 + 0.15 * tier.variation_scale;
        if let Some(prev) = prev_predicted {
            if prev > 0.0 {
                let change_ratio = predicted / prev;
                if change_ratio > 1.0 + max_change {
                    predicted = prev * (1.0 + max_change * 0.8);
                } else if change_ratio < 1.0 - max_change {
                    predicted = prev * (1.0 - max_change * 0.8);
                }
            }
        }

        let predicted = predicted.round().max(1.0);
        prev_predicted = Some(predicted);

        predictions.push(ForecastPoint {
            date,
            predicted_quantity: predicted,
            confidence: ConfidenceLevel::Low,
            lower_bound: Some((predicted - std_dev).round().max(0.0)),
            upper_bound: Some((predicted + std_dev).round()),
            ml_p50: None,
        });
    }

    predictions
}

/// Sample standard deviation of the most recent two weeks.
fn recent_std(history: &[Observation]) -> f64 {
    let window = history.len().min(14);
    let recent = &history[history.len() - window..];
    if recent.len() < 2 {
        let mean = recent.first().map(|o| o.quantity).unwrap_or(0.0);
        return (mean * 0.2).max(1.0);
    }
    let mean = recent.iter().map(|o| o.quantity).sum::<f64>() / recent.len() as f64;
    let variance = recent
        .iter()
        .map(|o| (o.quantity - mean).powi(2))
        .sum::<f64>()
        / (recent.len() - 1) as f64;
    variance.sqrt()
}

/// Small deterministic wiggle keyed on the calendar date.
fn date_variation(date: NaiveDate, variation_scale: f64) -> f64 {
    let seed = (date.day() * 3 + date.month() * 7 + date.weekday().num_days_from_monday() * 2) % 100;
    let max_variation = 0.05 * variation_scale;
    1.0 + ((seed as f64 - 50.0) / 100.0) * max_variation
}
