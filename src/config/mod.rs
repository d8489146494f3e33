/// Scoring thresholds and forecast policy
///
/// Every cutoff used by the pipeline lives here as a named, documented value
/// so it can be tuned and tested independently of the scoring logic. A TOML
/// file may override any subset; validation runs once at startup and a bad
/// set of thresholds is fatal there, never a per-call condition.

use serde::{Deserialize, Serialize};

use crate::core::AnalysisError;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub ema: EmaWindows,
    pub momentum: MomentumThresholds,
    pub burst: BurstThresholds,
    pub baseline: BaselineRules,
    pub forecast: ForecastPolicy,
}

/// Smoothing windows for the EMA triple.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmaWindows {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MomentumThresholds {
    /// Division guard for near-zero baselines
    pub epsilon: f64,
    /// Upper clamp on each window ratio
    pub ratio_cap: f64,
    /// Blend weights for the 7/14/30 ratios
    pub weight_short: f64,
    pub weight_medium: f64,
    pub weight_long: f64,
    /// Status cutoffs on the combined ratio, lower bound inclusive
    pub trending_up: f64,
    pub growing: f64,
    pub stable: f64,
    pub declining: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BurstThresholds {
    /// score >= elevated -> ELEVATED
    pub elevated: f64,
    /// score >= high -> HIGH
    pub high: f64,
    /// score >= critical -> CRITICAL
    pub critical: f64,
}

/// Calendar rules for the expected-demand baseline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BaselineRules {
    /// Payday window: day_of_month >= payday_start_day or <= payday_end_day
    pub payday_start_day: u32,
    pub payday_end_day: u32,
    /// Multiplier applied inside the payday window (valid range 1.0-2.5)
    pub payday_factor: f64,
    /// Mid-month soft patch, dipped slightly in the rule-based projection
    pub midmonth_dip_start: u32,
    pub midmonth_dip_end: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastPolicy {
    /// Days to project
    pub horizon_days: usize,
    /// Minimum history length before the remote model is attempted
    pub min_history_for_ml: usize,
    /// Base URL of the forecasting service
    pub service_url: String,
    /// Hard timeout on the single remote attempt
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ema: EmaWindows::default(),
            momentum: MomentumThresholds::default(),
            burst: BurstThresholds::default(),
            baseline: BaselineRules::default(),
            forecast: ForecastPolicy::default(),
        }
    }
}

impl Default for EmaWindows {
    fn default() -> Self {
        Self {
            short: 7,
            medium: 14,
            long: 30,
        }
    }
}

impl Default for MomentumThresholds {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            ratio_cap: 5.0,
            weight_short: 0.5,
            weight_medium: 0.3,
            weight_long: 0.2,
            trending_up: 1.3,
            growing: 1.1,
            stable: 0.9,
            declining: 0.7,
        }
    }
}

impl Default for BurstThresholds {
    fn default() -> Self {
        Self {
            elevated: 1.5,
            high: 2.5,
            critical: 4.0,
        }
    }
}

impl Default for BaselineRules {
    fn default() -> Self {
        Self {
            payday_start_day: 25,
            payday_end_day: 5,
            payday_factor: 1.15,
            midmonth_dip_start: 12,
            midmonth_dip_end: 18,
        }
    }
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            min_history_for_ml: 30,
            service_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.ema.short == 0 || self.ema.medium == 0 || self.ema.long == 0 {
            return Err(AnalysisError::Configuration(
                "EMA windows must be positive".to_string(),
            ));
        }
        if !(self.ema.short < self.ema.medium && self.ema.medium < self.ema.long) {
            return Err(AnalysisError::Configuration(
                "EMA windows must be strictly increasing (short < medium < long)".to_string(),
            ));
        }
        if self.momentum.epsilon <= 0.0 {
            return Err(AnalysisError::Configuration(
                "momentum epsilon must be positive".to_string(),
            ));
        }
        if self.momentum.ratio_cap < 1.0 {
            return Err(AnalysisError::Configuration(
                "momentum ratio_cap must be at least 1.0".to_string(),
            ));
        }
        let weight_sum = self.momentum.weight_short
            + self.momentum.weight_medium
            + self.momentum.weight_long;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(AnalysisError::Configuration(format!(
                "momentum weights must sum to 1.0, got {}",
                weight_sum
            )));
        }
        if !(self.momentum.declining < self.momentum.stable
            && self.momentum.stable < self.momentum.growing
            && self.momentum.growing < self.momentum.trending_up)
        {
            return Err(AnalysisError::Configuration(
                "momentum status thresholds must be strictly increasing".to_string(),
            ));
        }
        if !(self.burst.elevated < self.burst.high && self.burst.high < self.burst.critical) {
            return Err(AnalysisError::Configuration(
                "burst severity thresholds must be strictly increasing".to_string(),
            ));
        }
        if !(1.0..=2.5).contains(&self.baseline.payday_factor) {
            return Err(AnalysisError::Configuration(format!(
                "payday_factor must be within 1.0-2.5, got {}",
                self.baseline.payday_factor
            )));
        }
        if self.baseline.payday_start_day < 20 || self.baseline.payday_start_day > 31 {
            return Err(AnalysisError::Configuration(
                "payday_start_day must fall in the late-month range 20-31".to_string(),
            ));
        }
        if self.baseline.payday_end_day > 10 {
            return Err(AnalysisError::Configuration(
                "payday_end_day must fall in the early-month range 0-10".to_string(),
            ));
        }
        if self.baseline.midmonth_dip_start > self.baseline.midmonth_dip_end {
            return Err(AnalysisError::Configuration(
                "midmonth dip window is inverted".to_string(),
            ));
        }
        if self.forecast.horizon_days == 0 || self.forecast.horizon_days > 30 {
            return Err(AnalysisError::Configuration(
                "forecast horizon_days must be between 1 and 30".to_string(),
            ));
        }
        if self.forecast.request_timeout_secs == 0 {
            return Err(AnalysisError::Configuration(
                "forecast request_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
