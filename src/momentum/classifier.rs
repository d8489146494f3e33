/// Window-ratio momentum scoring and status labels

use crate::config::MomentumThresholds;
use crate::core::{Momentum, MomentumStatus};
use crate::features::Features;

/// Classify momentum from the smoothed features.
///
/// Each ratio measures a shorter EMA against a longer-window baseline EMA:
/// `momentum7` = 7d vs 14d, `momentum14` = 14d vs 30d, `momentum30` = 7d vs
/// 30d (the full-span ratio). Ratios are epsilon-guarded and clamped so a
/// near-zero baseline cannot dominate downstream scoring.
pub fn classify(features: &Features, thresholds: &MomentumThresholds) -> Momentum {
    let momentum7 = ratio(features.ema7, features.ema14, thresholds);
    let momentum14 = ratio(features.ema14, features.ema30, thresholds);
    let momentum30 = ratio(features.ema7, features.ema30, thresholds);

    let combined = thresholds.weight_short * momentum7
        + thresholds.weight_medium * momentum14
        + thresholds.weight_long * momentum30;

    Momentum {
        momentum7,
        momentum14,
        momentum30,
        combined,
        status: status_for(combined, thresholds),
    }
}

fn ratio(short: f64, long: f64, thresholds: &MomentumThresholds) -> f64 {
    (short / long.max(thresholds.epsilon)).clamp(0.0, thresholds.ratio_cap)
}

/// Lower bounds inclusive: a combined ratio sitting exactly on a threshold
/// lands in the more positive bucket.
fn status_for(combined: f64, thresholds: &MomentumThresholds) -> MomentumStatus {
    if combined >= thresholds.trending_up {
        MomentumStatus::TrendingUp
    } else if combined >= thresholds.growing {
        MomentumStatus::Growing
    } else if combined >= thresholds.stable {
        MomentumStatus::Stable
    } else if combined >= thresholds.declining {
        MomentumStatus::Declining
    } else {
        MomentumStatus::Falling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::Observation;
    use crate::features::compute_features;
    use chrono::{Duration, NaiveDate};

    fn history_from(quantities: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| Observation::new(start + Duration::days(i as i64), q))
            .collect()
    }

    fn classify_history(quantities: &[f64]) -> Momentum {
        let config = Config::default();
        let features = compute_features(&history_from(quantities), &config).unwrap();
        classify(&features, &config.momentum)
    }

    #[test]
    fn flat_history_is_stable_at_one() {
        let momentum = classify_history(&[10.0; 30]);
        assert!((momentum.combined - 1.0).abs() < 1e-9);
        assert_eq!(momentum.status, MomentumStatus::Stable);
    }

    #[test]
    fn strictly_increasing_history_never_reads_negative() {
        let quantities: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let momentum = classify_history(&quantities);
        assert!(momentum.combined >= 1.0);
        assert!(matches!(
            momentum.status,
            MomentumStatus::Stable | MomentumStatus::Growing | MomentumStatus::TrendingUp
        ));
    }

    #[test]
    fn steep_decline_reads_falling() {
        let quantities = [
            100.0, 88.0, 77.0, 68.0, 60.0, 53.0, 47.0, 41.0, 36.0, 32.0, 28.0, 25.0, 22.0, 20.0,
        ];
        let momentum = classify_history(&quantities);
        assert!(momentum.combined < 0.7);
        assert_eq!(momentum.status, MomentumStatus::Falling);
    }

    #[test]
    fn ratios_stay_bounded_after_extreme_jump() {
        let config = Config::default();
        // Long stretch of zeros then a jump: near-zero long EMA
        let mut quantities = vec![0.0; 29];
        quantities.push(100.0);
        let features = compute_features(&history_from(&quantities), &config).unwrap();
        let momentum = classify(&features, &config.momentum);
        assert!(momentum.momentum7 <= config.momentum.ratio_cap);
        assert!(momentum.momentum30 <= config.momentum.ratio_cap);
        assert!(momentum.combined <= config.momentum.ratio_cap);
    }

    #[test]
    fn zero_baseline_ratio_is_epsilon_guarded_and_clamped() {
        let thresholds = MomentumThresholds::default();
        assert_eq!(ratio(10.0, 0.0, &thresholds), thresholds.ratio_cap);
        assert_eq!(ratio(0.0, 0.0, &thresholds), 0.0);
    }

    #[test]
    fn threshold_boundaries_go_to_the_higher_bucket() {
        let thresholds = MomentumThresholds::default();
        assert_eq!(status_for(1.3, &thresholds), MomentumStatus::TrendingUp);
        assert_eq!(status_for(1.1, &thresholds), MomentumStatus::Growing);
        assert_eq!(status_for(0.9, &thresholds), MomentumStatus::Stable);
        assert_eq!(status_for(0.7, &thresholds), MomentumStatus::Declining);
        assert_eq!(status_for(0.69, &thresholds), MomentumStatus::Falling);
    }
}
