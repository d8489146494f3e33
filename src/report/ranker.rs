/// Ranking and summarization of per-product analyses into one weekly report

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{MomentumStatus, ProductIntelligence, TrendDirection};

const MAX_TOP_N: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub period: ReportPeriod,
    pub summary: StatusSummary,
    pub top_performers: Vec<ProductRanking>,
    pub needs_attention: Vec<ProductRanking>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

/// Momentum status counts across the portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total_products: usize,
    pub trending_up: usize,
    pub growing: usize,
    pub stable: usize,
    pub declining: usize,
    pub falling: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRanking {
    pub product_id: String,
    pub product_name: String,
    /// Balanced score: projected volume weighted by momentum
    pub score: f64,
    pub momentum_status: MomentumStatus,
    pub next_week_forecast: f64,
    pub avg_daily_forecast: f64,
    pub top_recommendation: Option<String>,
}

/// Build the weekly report for a set of analyzed products.
///
/// `top_n` is clamped to `[1, 20]`. Ranking is deterministic: score
/// descending, product id as the tie-break.
pub fn weekly_report(
    products: &[ProductIntelligence],
    generated_at: DateTime<Utc>,
    top_n: usize,
) -> WeeklyReport {
    let top_n = top_n.clamp(1, MAX_TOP_N);
    let end = generated_at.date_naive();

    let summary = StatusSummary {
        total_products: products.len(),
        trending_up: count_status(products, MomentumStatus::TrendingUp),
        growing: count_status(products, MomentumStatus::Growing),
        stable: count_status(products, MomentumStatus::Stable),
        declining: count_status(products, MomentumStatus::Declining),
        falling: count_status(products, MomentumStatus::Falling),
    };

    let mut ranked: Vec<ProductRanking> = products.iter().map(ranking_for).collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });

    let top_performers: Vec<ProductRanking> = ranked.iter().take(top_n).cloned().collect();

    let mut attention: Vec<ProductRanking> = products
        .iter()
        .filter(|p| needs_attention(p))
        .map(ranking_for)
        .collect();
    attention.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    attention.truncate(top_n);

    let insights = build_insights(&summary, &top_performers, &attention);

    WeeklyReport {
        period: ReportPeriod {
            start: end - Duration::days(7),
            end,
            days: 7,
        },
        summary,
        top_performers,
        needs_attention: attention,
        insights,
    }
}

fn count_status(products: &[ProductIntelligence], status: MomentumStatus) -> usize {
    products
        .iter()
        .filter(|p| p.realtime.momentum.status == status)
        .count()
}

fn ranking_for(product: &ProductIntelligence) -> ProductRanking {
    let forecast_total = product.forecast.total_next_7_days;
    ProductRanking {
        product_id: product.product_id.clone(),
        product_name: product.product_name.clone(),
        score: forecast_total * product.realtime.momentum.combined,
        momentum_status: product.realtime.momentum.status,
        next_week_forecast: forecast_total,
        avg_daily_forecast: forecast_total / 7.0,
        top_recommendation: product
            .recommendations
            .first()
            .map(|r| r.message.clone()),
    }
}

fn needs_attention(product: &ProductIntelligence) -> bool {
    matches!(
        product.realtime.momentum.status,
        MomentumStatus::Declining | MomentumStatus::Falling
    ) || product.forecast.trend == TrendDirection::Decreasing
}

fn build_insights(
    summary: &StatusSummary,
    top: &[ProductRanking],
    attention: &[ProductRanking],
) -> Vec<String> {
    let mut insights = Vec::new();

    let rising = summary.trending_up + summary.growing;
    if rising > 0 {
        insights.push(format!(
            "{} of {} products are gaining momentum this week.",
            rising, summary.total_products
        ));
    }
    if let Some(best) = top.first() {
        insights.push(format!(
            "Top performer: {} with a projected {:.0} units next week.",
            best.product_name, best.next_week_forecast
        ));
    }
    if !attention.is_empty() {
        insights.push(format!(
            "{} product(s) are losing ground and may need a promo or price review.",
            attention.len()
        ));
    }
    if insights.is_empty() {
        insights.push("Portfolio is stable; no product stands out this week.".to_string());
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Burst, BurstSeverity, ConfidenceReport, ForecastData, ForecastMethod, Momentum,
        RealtimeSignals,
    };
    use chrono::TimeZone;

    fn product(id: &str, status: MomentumStatus, combined: f64, total: f64) -> ProductIntelligence {
        let now = Utc.with_ymd_and_hms(2024, 4, 15, 8, 0, 0).unwrap();
        ProductIntelligence {
            product_id: id.to_string(),
            product_name: format!("Product {}", id),
            realtime: RealtimeSignals {
                momentum: Momentum {
                    momentum7: combined,
                    momentum14: combined,
                    momentum30: combined,
                    combined,
                    status,
                },
                burst: Burst {
                    score: 1.0,
                    severity: BurstSeverity::Normal,
                    classification: None,
                },
                last_updated: now,
            },
            forecast: ForecastData {
                predictions: Vec::new(),
                trend: TrendDirection::Stable,
                method: ForecastMethod::RuleBasedFallback,
                total_next_7_days: total,
                summary: String::new(),
            },
            recommendations: Vec::new(),
            confidence: ConfidenceReport {
                overall: 0.7,
                data_quality: 1.0,
                model_agreement: 0.5,
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 15, 8, 0, 0).unwrap()
    }

    #[test]
    fn status_counts_cover_every_product() {
        let products = vec![
            product("a", MomentumStatus::TrendingUp, 1.5, 100.0),
            product("b", MomentumStatus::Stable, 1.0, 70.0),
            product("c", MomentumStatus::Falling, 0.6, 40.0),
            product("d", MomentumStatus::Stable, 1.0, 50.0),
        ];
        let report = weekly_report(&products, now(), 3);
        let s = &report.summary;
        assert_eq!(s.total_products, 4);
        assert_eq!(
            s.trending_up + s.growing + s.stable + s.declining + s.falling,
            4
        );
        assert_eq!(s.stable, 2);
        assert_eq!(s.falling, 1);
    }

    #[test]
    fn top_performers_are_ranked_by_score() {
        let products = vec![
            product("a", MomentumStatus::Stable, 1.0, 70.0),
            product("b", MomentumStatus::TrendingUp, 1.5, 100.0),
            product("c", MomentumStatus::Falling, 0.6, 40.0),
        ];
        let report = weekly_report(&products, now(), 2);
        assert_eq!(report.top_performers.len(), 2);
        assert_eq!(report.top_performers[0].product_id, "b");
        assert_eq!(report.top_performers[1].product_id, "a");
    }

    #[test]
    fn falling_products_land_in_needs_attention() {
        let products = vec![
            product("a", MomentumStatus::Stable, 1.0, 70.0),
            product("b", MomentumStatus::Falling, 0.6, 40.0),
        ];
        let report = weekly_report(&products, now(), 3);
        assert_eq!(report.needs_attention.len(), 1);
        assert_eq!(report.needs_attention[0].product_id, "b");
    }

    #[test]
    fn top_n_is_clamped() {
        let products: Vec<ProductIntelligence> = (0..30)
            .map(|i| product(&format!("p{:02}", i), MomentumStatus::Stable, 1.0, 50.0))
            .collect();
        assert_eq!(weekly_report(&products, now(), 100).top_performers.len(), 20);
        assert_eq!(weekly_report(&products, now(), 0).top_performers.len(), 1);
    }

    #[test]
    fn period_spans_the_last_seven_days() {
        let report = weekly_report(&[], now(), 3);
        assert_eq!(report.period.days, 7);
        assert_eq!(
            report.period.end - report.period.start,
            Duration::days(7)
        );
    }
}
