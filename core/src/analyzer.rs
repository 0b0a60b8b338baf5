//! The analyzer — the single entry point callers use.
//!
//! ORDER (fixed):
//!   1. Scorer        — every record, independently
//!   2. Aggregator    — the whole scored batch at once
//!
//! RULES:
//!   - The analyzer performs no input validation; see `ingest`.
//!   - It holds no state between calls other than its configuration
//!     and RNG bank. Scored output is freshly allocated per call.
//!   - All randomness flows through the RngBank.

use crate::{
    config::DetectionConfig,
    error::ScanResult,
    insights::{FraudInsight, InsightAggregator},
    rng::RngBank,
    scoring::Scorer,
    transaction::{ScoredTransaction, TransactionRecord},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// Same length and order as the input records.
    pub scored: Vec<ScoredTransaction>,
    /// Zero to four findings, in pass order.
    pub insights: Vec<FraudInsight>,
}

impl AnalysisResult {
    pub fn high_risk_count(&self) -> usize {
        self.scored.iter().filter(|t| t.is_high_risk()).count()
    }
}

pub struct FraudAnalyzer {
    rng_bank: RngBank,
    config: DetectionConfig,
    scorer: Scorer,
    aggregator: InsightAggregator,
}

impl FraudAnalyzer {
    /// Build from a config the caller has already validated, as
    /// `DetectionConfig::load` and `DetectionConfig::default` are.
    /// Use `try_new` for configs assembled in code.
    pub fn new(config: DetectionConfig) -> Self {
        let rng_bank = RngBank::from_config(&config.noise);
        Self::with_rng_bank(config, rng_bank)
    }

    /// Validate the config, then build.
    pub fn try_new(config: DetectionConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Build with an explicit RNG bank, e.g. a fixed seed in tests.
    pub fn with_rng_bank(config: DetectionConfig, rng_bank: RngBank) -> Self {
        Self {
            scorer: Scorer::new(&config),
            aggregator: InsightAggregator::new(config.insights.clone()),
            rng_bank,
            config,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn rng_bank(&self) -> &RngBank {
        &self.rng_bank
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn aggregator(&self) -> &InsightAggregator {
        &self.aggregator
    }

    pub fn analyze(&self, records: &[TransactionRecord]) -> AnalysisResult {
        let scored = self.scorer.score_batch(records, &self.rng_bank);
        let insights = self.aggregator.aggregate(&scored);
        let result = AnalysisResult { scored, insights };

        log::info!(
            "analysis complete: transactions={} high_risk={} insights={}",
            result.scored.len(),
            result.high_risk_count(),
            result.insights.len()
        );

        result
    }
}

/// One-shot analysis with a throwaway analyzer.
pub fn analyze(records: &[TransactionRecord], config: &DetectionConfig) -> AnalysisResult {
    FraudAnalyzer::new(config.clone()).analyze(records)
}
