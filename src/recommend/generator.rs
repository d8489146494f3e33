/// Rule engine turning momentum, burst and forecast signals into
/// prioritized, human-readable recommendations

use crate::core::{
    Burst, BurstSeverity, ConfidenceLevel, ForecastData, Momentum, MomentumStatus, Priority,
    Recommendation, RecommendationType, TrendDirection,
};

/// Stock buffer applied when demand is spiking.
const SCALE_UP_BUFFER: f64 = 1.3;
/// Buffer applied to the pre-peak phase of a two-phase plan.
const PRE_PEAK_BUFFER: f64 = 1.2;
/// A forecast counts as peak-then-decline when the final day drops below
/// this fraction of the peak.
const POST_PEAK_DROP: f64 = 0.75;

/// Evaluate every rule; several may fire. Output is not yet sorted; callers
/// pass it through [`sort_recommendations`] before display.
pub fn generate(momentum: &Momentum, burst: &Burst, forecast: &ForecastData) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    let total = forecast.total_next_7_days;
    let avg_daily = total / forecast.predictions.len().max(1) as f64;

    if burst.severity == BurstSeverity::Critical {
        if forecast.trend == TrendDirection::Increasing {
            recommendations.push(Recommendation {
                kind: RecommendationType::ScaleUp,
                priority: Priority::Urgent,
                message: "Sales are spiking and the forecast keeps climbing.".to_string(),
                action: format!(
                    "Prepare {:.0} units for the next 7 days (+30% buffer).",
                    total * SCALE_UP_BUFFER
                ),
                actionable: true,
                details: vec![
                    format!("Spike: {:.1}x above the expected baseline", burst.score),
                    format!("Momentum: {:+.0}%", (momentum.combined - 1.0) * 100.0),
                    "Forecast trend: INCREASING".to_string(),
                ],
            });
        } else {
            recommendations.push(Recommendation {
                kind: RecommendationType::ScaleUp,
                priority: Priority::Urgent,
                message: "Today's sales are far above the expected baseline.".to_string(),
                action: format!(
                    "Check stock now; cover at least {:.0} units for the coming week.",
                    total * SCALE_UP_BUFFER
                ),
                actionable: true,
                details: vec![format!(
                    "Spike: {:.1}x above the expected baseline",
                    burst.score
                )],
            });
        }
    }

    if let Some(peak) = detect_peak_with_decline(forecast) {
        recommendations.push(peak);
    }

    if matches!(
        momentum.status,
        MomentumStatus::Falling | MomentumStatus::Declining
    ) && forecast.trend == TrendDirection::Decreasing
    {
        recommendations.push(Recommendation {
            kind: RecommendationType::Intervention,
            priority: Priority::High,
            message: "Sales are declining and the forecast expects the slide to continue."
                .to_string(),
            action: "Consider a promo or bundling to stop the decline.".to_string(),
            actionable: true,
            details: vec![
                "Run a limited discount or buy-2-get-1 promo".to_string(),
                "Bundle with a product that still sells".to_string(),
                "Review pricing against competitors".to_string(),
                "Collect customer feedback".to_string(),
            ],
        });
    }

    if burst.severity == BurstSeverity::High {
        recommendations.push(Recommendation {
            kind: RecommendationType::Monitor,
            priority: Priority::Medium,
            message: "Sales are running well above baseline but short of critical.".to_string(),
            action: "Watch the next few days; be ready to restock early.".to_string(),
            actionable: false,
            details: vec![format!(
                "Spike: {:.1}x above the expected baseline",
                burst.score
            )],
        });
    }

    let first_confidence = forecast
        .predictions
        .first()
        .map(|p| p.confidence)
        .unwrap_or(ConfidenceLevel::Low);
    if momentum.status == MomentumStatus::Stable && first_confidence == ConfidenceLevel::High {
        recommendations.push(Recommendation {
            kind: RecommendationType::Optimize,
            priority: Priority::Low,
            message: "Demand is stable and predictable.".to_string(),
            action: format!(
                "Maintain a stock level of about {:.0} units (3-day buffer).",
                avg_daily * 3.0
            ),
            actionable: true,
            details: vec![format!("Projected daily demand: {:.0} units", avg_daily)],
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationType::Standard,
            priority: Priority::Medium,
            message: format!(
                "Projected demand for the next 7 days: {:.0} units.",
                total
            ),
            action: format!(
                "Prepare around {:.0} units per day with a small buffer.",
                avg_daily
            ),
            actionable: true,
            details: vec![
                format!("7-day total: {:.0} units", total),
                format!("Daily average: {:.0} units", avg_daily),
                format!("Trend: {}", forecast.trend),
            ],
        });
    }

    recommendations
}

/// Two-phase stocking plan when the forecast rises to a peak and then falls
/// away. Staging stock around the peak avoids the waste of flat
/// over-production across the whole week.
fn detect_peak_with_decline(forecast: &ForecastData) -> Option<Recommendation> {
    let values: Vec<f64> = forecast
        .predictions
        .iter()
        .map(|p| p.predicted_quantity)
        .collect();
    if values.len() < 3 {
        return None;
    }

    let (peak_index, &peak_value) = values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    let last = *values.last()?;

    // A real peak has a rise before it and room to fall after it
    let peak_inside_curve = peak_index >= 1 && peak_index < values.len() - 2;
    if !(peak_inside_curve && peak_value > 0.0 && last < peak_value * POST_PEAK_DROP) {
        return None;
    }

    let before_peak: f64 = values[..=peak_index].iter().sum();
    let after_peak: f64 = values[peak_index + 1..].iter().sum();
    let stock_before = (before_peak * PRE_PEAK_BUFFER).round();
    let stock_after = after_peak.round();
    let naive_total = (values.iter().sum::<f64>() * SCALE_UP_BUFFER).round();
    let savings = (naive_total - stock_before - stock_after).max(0.0);
    let drop_percent = (1.0 - last / peak_value) * 100.0;
    let peak_date = forecast.predictions[peak_index].date;

    Some(Recommendation {
        kind: RecommendationType::PeakStrategy,
        priority: Priority::High,
        message: format!(
            "Demand peaks on day {} ({}) and then falls about {:.0}%.",
            peak_index + 1,
            peak_date,
            drop_percent
        ),
        action: format!(
            "Stage stock in two phases: {:.0} units through the peak, then only {:.0} units after.",
            stock_before, stock_after
        ),
        actionable: true,
        details: vec![
            format!(
                "Phase 1 (day 1-{}): {:.0} units (+20% buffer)",
                peak_index + 1,
                stock_before
            ),
            format!(
                "Phase 2 (day {}-{}): {:.0} units, no buffer",
                peak_index + 2,
                values.len(),
                stock_after
            ),
            format!("Saves roughly {:.0} units vs flat overstocking", savings),
        ],
    })
}

/// Stable ascending sort by priority rank: URGENT < HIGH < MEDIUM < LOW.
/// Equal priorities keep their generation order.
pub fn sort_recommendations(mut recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    recommendations.sort_by_key(|r| r.priority.rank());
    recommendations
}
