/// Time-series feature engine
///
/// Turns an ordered sales history into the smoothed signals every downstream
/// stage consumes: the 7/14/30 EMA triple, weekday factors, the payday rule,
/// and the per-date expected baseline. Pure and deterministic; recomputed
/// from the supplied window on every call.

pub mod baseline;
pub mod ema;

pub use baseline::{day_of_week_factors, is_midmonth_dip, is_payday_window};
pub use ema::ema;

use chrono::{Datelike, NaiveDate};

use crate::config::{BaselineRules, Config};
use crate::core::{AnalysisError, Observation};

/// Derived signals for one product's history.
#[derive(Debug, Clone)]
pub struct Features {
    pub ema7: f64,
    pub ema14: f64,
    pub ema30: f64,
    /// Weekday demand multipliers, Monday first
    pub dow_factor: [f64; 7],
    /// Boost applied inside the payday window
    pub payday_factor: f64,
    pub overall_mean: f64,
    rules: BaselineRules,
}

impl Features {
    /// Expected quantity for a calendar date:
    /// `overall_mean * dow_factor[weekday] * (payday_factor inside the window)`.
    pub fn baseline(&self, date: NaiveDate) -> f64 {
        self.baseline_with_dow_clamp(date, None)
    }

    /// Baseline with the weekday factor clamped to a range. The rule-based
    /// projection tightens the clamp when history is thin and the learned
    /// weekday pattern is noise.
    pub fn baseline_with_dow_clamp(&self, date: NaiveDate, clamp: Option<(f64, f64)>) -> f64 {
        let day = date.weekday().num_days_from_monday() as usize;
        let mut dow = self.dow_factor[day];
        if let Some((lo, hi)) = clamp {
            dow = dow.clamp(lo, hi);
        }
        let payday = if is_payday_window(date, &self.rules) {
            self.payday_factor
        } else {
            1.0
        };
        self.overall_mean * dow * payday
    }

    pub fn rules(&self) -> &BaselineRules {
        &self.rules
    }
}

/// Compute the full feature set for an ascending, possibly gapped history.
///
/// Fails only on an empty history; everything downstream is guarded against
/// zero baselines with epsilon division.
pub fn compute_features(
    history: &[Observation],
    config: &Config,
) -> Result<Features, AnalysisError> {
    if history.is_empty() {
        return Err(AnalysisError::InsufficientData);
    }

    let quantities: Vec<f64> = history.iter().map(|o| o.quantity).collect();
    let overall_mean = quantities.iter().sum::<f64>() / quantities.len() as f64;

    Ok(Features {
        ema7: ema(&quantities, config.ema.short),
        ema14: ema(&quantities, config.ema.medium),
        ema30: ema(&quantities, config.ema.long),
        dow_factor: day_of_week_factors(history, overall_mean),
        payday_factor: config.baseline.payday_factor,
        overall_mean,
        rules: config.baseline.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_history(start: NaiveDate, days: usize, quantity: f64) -> Vec<Observation> {
        (0..days)
            .map(|i| Observation::new(start + Duration::days(i as i64), quantity))
            .collect()
    }

    #[test]
    fn empty_history_is_rejected() {
        let config = Config::default();
        assert!(matches!(
            compute_features(&[], &config),
            Err(AnalysisError::InsufficientData)
        ));
    }

    #[test]
    fn flat_history_yields_flat_features() {
        let config = Config::default();
        let history = flat_history(date(2024, 3, 10), 30, 10.0);
        let features = compute_features(&history, &config).unwrap();

        assert!((features.ema7 - 10.0).abs() < 1e-9);
        assert!((features.ema14 - 10.0).abs() < 1e-9);
        assert!((features.ema30 - 10.0).abs() < 1e-9);
        assert!((features.overall_mean - 10.0).abs() < 1e-9);
        for factor in features.dow_factor {
            assert!((factor - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn baseline_applies_payday_boost() {
        let config = Config::default();
        let history = flat_history(date(2024, 3, 10), 30, 10.0);
        let features = compute_features(&history, &config).unwrap();

        // 2024-04-08 is outside both the payday and dip windows
        let plain = features.baseline(date(2024, 4, 8));
        let payday = features.baseline(date(2024, 4, 26));
        assert!((plain - 10.0).abs() < 1e-9);
        assert!((payday - 10.0 * config.baseline.payday_factor).abs() < 1e-9);
    }

    #[test]
    fn gapped_history_is_accepted() {
        let config = Config::default();
        let history = vec![
            Observation::new(date(2024, 4, 1), 10.0),
            Observation::new(date(2024, 4, 4), 12.0),
            Observation::new(date(2024, 4, 9), 8.0),
        ];
        let features = compute_features(&history, &config).unwrap();
        assert!((features.overall_mean - 10.0).abs() < 1e-9);
    }

    #[test]
    fn dow_clamp_bounds_learned_factor() {
        let config = Config::default();
        // Saturday triple of everything else
        let start = date(2024, 4, 1);
        let history: Vec<Observation> = (0..14)
            .map(|i| {
                let d = start + Duration::days(i);
                let quantity = if d.weekday() == chrono::Weekday::Sat {
                    30.0
                } else {
                    10.0
                };
                Observation::new(d, quantity)
            })
            .collect();
        let features = compute_features(&history, &config).unwrap();

        let saturday = date(2024, 4, 6);
        let clamped = features.baseline_with_dow_clamp(saturday, Some((0.9, 1.1)));
        let free = features.baseline(saturday);
        assert!(free > clamped);
        assert!((clamped - features.overall_mean * 1.1).abs() < 1e-9);
    }
}
