/// Product intelligence engine
///
/// Explicitly constructed orchestrator: validated config in, injected
/// forecast client, no ambient state. One `analyze` call chains features ->
/// momentum + burst -> forecast -> recommendations and assembles the final
/// `ProductIntelligence`. Calls for different products share nothing and may
/// run concurrently.

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::burst::{detect, BurstInput};
use crate::config::Config;
use crate::core::{
    AnalysisError, Burst, ConfidenceReport, Observation, ProductIntelligence, RealtimeSignals,
};
use crate::features::{compute_features, Features};
use crate::forecast::ForecastAggregator;
use crate::momentum::classify;
use crate::recommend::{generate, sort_recommendations};

/// Weight of data quality vs model agreement in the overall confidence.
const DATA_QUALITY_WEIGHT: f64 = 0.6;
const MODEL_AGREEMENT_WEIGHT: f64 = 0.4;
/// Full data quality is reached at this many days of history.
const FULL_QUALITY_DAYS: f64 = 30.0;
/// Agreement reported when only the rule-based model ran.
const NEUTRAL_AGREEMENT: f64 = 0.5;

pub struct IntelligenceEngine {
    config: Config,
    forecaster: ForecastAggregator,
}

impl IntelligenceEngine {
    /// Build an engine from a validated config. Threshold problems are fatal
    /// here, never inside an analysis call.
    pub fn new(config: Config) -> Result<Self, AnalysisError> {
        config.validate()?;
        let forecaster = ForecastAggregator::new(&config);
        Ok(Self { config, forecaster })
    }

    /// Analyze one product's sales history.
    pub async fn analyze(
        &self,
        product_id: &str,
        product_name: &str,
        history: &[Observation],
    ) -> Result<ProductIntelligence, AnalysisError> {
        self.analyze_at(product_id, product_name, history, Utc::now())
            .await
    }

    /// Same as [`analyze`](Self::analyze) with an explicit timestamp, making
    /// the whole call a pure function of its arguments and the remote
    /// forecast response.
    #[instrument(skip(self, history), fields(observations = history.len()))]
    pub async fn analyze_at(
        &self,
        product_id: &str,
        product_name: &str,
        history: &[Observation],
        now: DateTime<Utc>,
    ) -> Result<ProductIntelligence, AnalysisError> {
        let features = compute_features(history, &self.config)?;
        let momentum = classify(&features, &self.config.momentum);
        let burst = self.detect_burst(history, &features)?;

        let outcome = self
            .forecaster
            .forecast(product_id, history, &features, &momentum)
            .await;

        let recommendations = sort_recommendations(generate(&momentum, &burst, &outcome.data));

        let data_quality = (history.len() as f64 / FULL_QUALITY_DAYS).min(1.0);
        let model_agreement = outcome.model_agreement.unwrap_or(NEUTRAL_AGREEMENT);
        let overall =
            DATA_QUALITY_WEIGHT * data_quality + MODEL_AGREEMENT_WEIGHT * model_agreement;

        info!(
            "Analysis for {}: momentum {}, burst {}, {} recommendation(s)",
            product_id,
            momentum.status,
            burst.severity,
            recommendations.len()
        );

        Ok(ProductIntelligence {
            product_id: product_id.to_string(),
            product_name: product_name.to_string(),
            realtime: RealtimeSignals {
                momentum,
                burst,
                last_updated: now,
            },
            forecast: outcome.data,
            recommendations,
            confidence: ConfidenceReport {
                overall,
                data_quality,
                model_agreement,
            },
        })
    }

    /// Burst baselines come from the history strictly before each compared
    /// observation, so a spike cannot inflate its own expectation.
    fn detect_burst(
        &self,
        history: &[Observation],
        full_features: &Features,
    ) -> Result<Burst, AnalysisError> {
        let n = history.len();
        let latest = &history[n - 1];

        let latest_baseline = if n > 1 {
            compute_features(&history[..n - 1], &self.config)?.baseline(latest.date)
        } else {
            full_features.baseline(latest.date)
        };

        let previous_features;
        let previous = if n > 2 {
            previous_features = compute_features(&history[..n - 2], &self.config)?;
            let prev = &history[n - 2];
            Some(BurstInput {
                observation: prev,
                baseline: previous_features.baseline(prev.date),
            })
        } else {
            None
        };

        Ok(detect(
            BurstInput {
                observation: latest,
                baseline: latest_baseline,
            },
            previous,
            &self.config.burst,
            self.config.momentum.epsilon,
        ))
    }
}
