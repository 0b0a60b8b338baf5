use crate::{
    error::{ScanError, ScanResult},
    scoring::{Condition, Rule},
};
use serde::{Deserialize, Serialize};

// ── Noise ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    /// Fresh master seed per analyzer. Production default.
    #[default]
    Random,
    /// Reproducible scores for a fixed seed.
    Seeded { seed: u64 },
    /// No perturbation at all.
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub mode: NoiseMode,
    /// Half-width of the uniform perturbation added to each score.
    pub amplitude: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            mode: NoiseMode::Random,
            amplitude: 0.1,
        }
    }
}

// ── Risk tiers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Scores strictly above this are High.
    pub high: f64,
    /// Scores strictly above this (and not High) are Medium.
    pub medium: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 0.7,
            medium: 0.4,
        }
    }
}

// ── Insights ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Per-store High ratio above which a store is flagged.
    pub store_fraud_ratio: f64,
    /// How many flagged stores the store insight names.
    pub max_listed_stores: usize,
    /// Batch-wide High ratio above which the overall insight fires.
    pub overall_fraud_ratio: f64,
    /// Benchmark quoted by the overall insight.
    pub benchmark_label: String,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            store_fraud_ratio: 0.30,
            max_listed_stores: 3,
            overall_fraud_ratio: 0.05,
            benchmark_label: "3-5%".into(),
        }
    }
}

// ── Ingestion ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_validation_errors: usize,
    pub default_payment_type: String,
    /// Centre used to synthesize coordinates for rows without any.
    pub fallback_lat: f64,
    pub fallback_lng: f64,
    /// Synthesized coordinates land within ± this many degrees of the centre.
    pub jitter_degrees: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_validation_errors: 10,
            default_payment_type: "Credit Card".into(),
            fallback_lat: 40.7128,
            fallback_lng: -74.0060,
            jitter_degrees: 5.0,
        }
    }
}

// ── Top level ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Evaluated in order; tags appear in `fraud_type` in this order.
    pub rules: Vec<Rule>,
    pub noise: NoiseConfig,
    pub tiers: TierThresholds,
    pub insights: InsightThresholds,
    pub ingest: IngestConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            noise: NoiseConfig::default(),
            tiers: TierThresholds::default(),
            insights: InsightThresholds::default(),
            ingest: IngestConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    /// In tests, use DetectionConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DetectionConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Default rule table with perturbation switched off.
    pub fn default_test() -> Self {
        Self {
            noise: NoiseConfig {
                mode: NoiseMode::Disabled,
                amplitude: 0.1,
            },
            ..Self::default()
        }
    }

    pub fn with_noise_mode(mut self, mode: NoiseMode) -> Self {
        self.noise.mode = mode;
        self
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !(0.0..=1.0).contains(&self.noise.amplitude) {
            return Err(config_error(format!(
                "noise amplitude must be within [0, 1], got {}",
                self.noise.amplitude
            )));
        }
        if self.tiers.medium > self.tiers.high {
            return Err(config_error(format!(
                "medium tier threshold {} exceeds high tier threshold {}",
                self.tiers.medium, self.tiers.high
            )));
        }
        for rule in &self.rules {
            if rule.tag.trim().is_empty() {
                return Err(config_error("rule with an empty tag".into()));
            }
            if !rule.weight.is_finite() {
                return Err(config_error(format!(
                    "rule '{}' has a non-finite weight",
                    rule.tag
                )));
            }
        }
        if self.ingest.max_validation_errors == 0 {
            return Err(config_error("max_validation_errors must be > 0".into()));
        }
        Ok(())
    }
}

fn config_error(message: String) -> ScanError {
    ScanError::Config { message }
}

/// The stock rule table. Store and product flags are demo values.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            "High Amount",
            0.30,
            Condition::AmountAbove { threshold: 1000.0 },
        ),
        Rule::new(
            "Suspicious Low Amount",
            0.40,
            Condition::AmountBelow { threshold: 1.0 },
        ),
        Rule::new(
            "Large Cash Transaction",
            0.20,
            Condition::PaymentTypeAmountAbove {
                payment_type: "Cash".into(),
                threshold: 500.0,
            },
        ),
        Rule::new(
            "Off-Hours Activity",
            0.25,
            Condition::HourOutside { start: 6, end: 22 },
        ),
        Rule::new(
            "High-Risk Store",
            0.20,
            Condition::StoreIdContains {
                patterns: vec!["ST001".into(), "ST003".into()],
            },
        ),
        Rule::new(
            "High-Risk Product",
            0.30,
            Condition::ProductIdContains {
                patterns: vec!["GIFT".into(), "RETURN".into()],
            },
        ),
    ]
}
