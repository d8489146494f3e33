/// Latest-observation spike scoring and severity classification

use crate::config::BurstThresholds;
use crate::core::{Burst, BurstClassification, BurstSeverity, Observation};

/// One observation paired with the baseline expected for its date.
///
/// Baselines are computed from the history *before* the observation so a
/// spike cannot inflate its own expectation.
#[derive(Debug, Clone, Copy)]
pub struct BurstInput<'a> {
    pub observation: &'a Observation,
    pub baseline: f64,
}

/// Score the latest observation against its baseline.
///
/// `score = quantity / max(baseline, epsilon)`; severity rises through the
/// NORMAL/ELEVATED/HIGH/CRITICAL staircase with inclusive lower bounds. When
/// the previous day also scored at or above the elevated cutoff the spike is
/// sustained (`VIRAL_SPIKE`); an elevated day without that backing is an
/// `ISOLATED_SPIKE`. Pure function of its inputs.
pub fn detect(
    latest: BurstInput,
    previous: Option<BurstInput>,
    thresholds: &BurstThresholds,
    epsilon: f64,
) -> Burst {
    let score = burst_score(latest, epsilon);
    let severity = severity_for(score, thresholds);

    let classification = if severity == BurstSeverity::Normal {
        None
    } else {
        let sustained = previous
            .map(|prev| burst_score(prev, epsilon) >= thresholds.elevated)
            .unwrap_or(false);
        Some(if sustained {
            BurstClassification::ViralSpike
        } else {
            BurstClassification::IsolatedSpike
        })
    };

    Burst {
        score,
        severity,
        classification,
    }
}

fn burst_score(input: BurstInput, epsilon: f64) -> f64 {
    input.observation.quantity / input.baseline.max(epsilon)
}

fn severity_for(score: f64, thresholds: &BurstThresholds) -> BurstSeverity {
    if score >= thresholds.critical {
        BurstSeverity::Critical
    } else if score >= thresholds.high {
        BurstSeverity::High
    } else if score >= thresholds.elevated {
        BurstSeverity::Elevated
    } else {
        BurstSeverity::Normal
    }
}
