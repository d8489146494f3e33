/// Shared data contracts for the intelligence pipeline
///
/// Field names and enum string values here are consumed verbatim by the
/// dashboard, so every rename attribute is load-bearing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single day's recorded sales for one product.
///
/// Histories are ordered ascending by date. Missing dates are absent entries,
/// never zero-quantity rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub quantity: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, quantity: f64) -> Self {
        Self { date, quantity }
    }
}

/// Momentum trend labels, strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentumStatus {
    /// Combined ratio at or above the trending threshold
    TrendingUp,
    /// Healthy growth, short windows outpacing the long baseline
    Growing,
    /// Demand moving sideways
    Stable,
    /// Short windows losing ground against the baseline
    Declining,
    /// Sustained contraction
    Falling,
}

impl std::fmt::Display for MomentumStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MomentumStatus::TrendingUp => write!(f, "TRENDING_UP"),
            MomentumStatus::Growing => write!(f, "GROWING"),
            MomentumStatus::Stable => write!(f, "STABLE"),
            MomentumStatus::Declining => write!(f, "DECLINING"),
            MomentumStatus::Falling => write!(f, "FALLING"),
        }
    }
}

/// Momentum ratios for the 7/14/30 day windows plus the blended score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Momentum {
    pub momentum7: f64,
    pub momentum14: f64,
    pub momentum30: f64,
    pub combined: f64,
    pub status: MomentumStatus,
}

/// Burst severity staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BurstSeverity {
    Normal,
    Elevated,
    High,
    Critical,
}

impl BurstSeverity {
    /// Rank for ordering comparisons (higher = more severe).
    pub fn rank(&self) -> u8 {
        match self {
            BurstSeverity::Normal => 0,
            BurstSeverity::Elevated => 1,
            BurstSeverity::High => 2,
            BurstSeverity::Critical => 3,
        }
    }
}

impl std::fmt::Display for BurstSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BurstSeverity::Normal => write!(f, "NORMAL"),
            BurstSeverity::Elevated => write!(f, "ELEVATED"),
            BurstSeverity::High => write!(f, "HIGH"),
            BurstSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Shape of an elevated burst: sustained across consecutive days or a
/// one-day outlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BurstClassification {
    ViralSpike,
    IsolatedSpike,
}

/// Latest-observation spike measurement against the expected baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub score: f64,
    pub severity: BurstSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<BurstClassification>,
}

/// Per-prediction confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Direction of the forecast curve, first day vs last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TrendDirection::Increasing => write!(f, "INCREASING"),
            TrendDirection::Decreasing => write!(f, "DECREASING"),
            TrendDirection::Stable => write!(f, "STABLE"),
        }
    }
}

/// How the forecast was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    /// Remote quantile model blended with the local projection
    Ml,
    /// Local baseline-times-momentum projection only
    RuleBasedFallback,
}

/// One forecasted day.
///
/// The `ml_*` fields are present only when the remote model contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_quantity: f64,
    pub confidence: ConfidenceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_p50: Option<f64>,
}

/// Full forecast bundle for the requested horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastData {
    pub predictions: Vec<ForecastPoint>,
    pub trend: TrendDirection,
    pub method: ForecastMethod,
    #[serde(rename = "totalNext7Days")]
    pub total_next_7_days: f64,
    pub summary: String,
}

/// Recommendation urgency, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank consumed by the dashboard: URGENT(0) < HIGH(1) < MEDIUM(2) < LOW(3).
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Priority::Urgent => write!(f, "URGENT"),
            Priority::High => write!(f, "HIGH"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::Low => write!(f, "LOW"),
        }
    }
}

/// Recommendation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    /// Demand spike: increase stock/production
    ScaleUp,
    /// Forecast peaks then falls: stage stock in two phases
    PeakStrategy,
    /// Demand eroding: promo, bundling, price review
    Intervention,
    /// Elevated but not critical: watch closely
    Monitor,
    /// Stable demand: hold an efficient buffer
    Optimize,
    /// Informational forecast summary
    Standard,
}

/// One actionable recommendation produced by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub message: String,
    pub action: String,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

/// Momentum and burst signals computed from the latest observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeSignals {
    pub momentum: Momentum,
    pub burst: Burst,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Confidence breakdown for the whole analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub overall: f64,
    #[serde(rename = "dataQuality")]
    pub data_quality: f64,
    #[serde(rename = "modelAgreement")]
    pub model_agreement: f64,
}

/// Aggregate analysis output for one product.
///
/// Fully reconstructible from `(product_id, product_name, history)` plus the
/// remote forecast response; carries no hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIntelligence {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    pub realtime: RealtimeSignals,
    pub forecast: ForecastData,
    pub recommendations: Vec<Recommendation>,
    pub confidence: ConfidenceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_wire_strings_match_dashboard_contract() {
        assert_eq!(
            serde_json::to_string(&MomentumStatus::TrendingUp).unwrap(),
            "\"TRENDING_UP\""
        );
        assert_eq!(
            serde_json::to_string(&BurstSeverity::Critical).unwrap(),
            "\"CRITICAL\""
        );
        assert_eq!(
            serde_json::to_string(&Priority::Urgent).unwrap(),
            "\"URGENT\""
        );
        assert_eq!(
            serde_json::to_string(&ForecastMethod::RuleBasedFallback).unwrap(),
            "\"rule_based_fallback\""
        );
        assert_eq!(
            serde_json::to_string(&BurstClassification::ViralSpike).unwrap(),
            "\"VIRAL_SPIKE\""
        );
        assert_eq!(
            serde_json::to_string(&TrendDirection::Increasing).unwrap(),
            "\"INCREASING\""
        );
    }

    #[test]
    fn priority_rank_ordering() {
        assert!(Priority::Urgent.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
    }

    #[test]
    fn optional_fields_omitted_from_json() {
        let burst = Burst {
            score: 1.0,
            severity: BurstSeverity::Normal,
            classification: None,
        };
        let json = serde_json::to_string(&burst).unwrap();
        assert!(!json.contains("classification"));
    }
}
