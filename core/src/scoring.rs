//! Per-transaction fraud scoring.
//!
//! Scoring runs a flat, ordered rule table over each record:
//!   1. Every rule whose condition holds adds its weight to the score
//!   2. A bounded uniform perturbation is added
//!   3. The result is clamped to [0, 1] and mapped to a risk tier
//!
//! Records are scored independently. Each record's perturbation comes from
//! its own RNG stream, so batch order never changes an individual score.

use crate::{
    config::{DetectionConfig, TierThresholds},
    rng::{RngBank, ScoringRng},
    transaction::{
        RiskLevel, ScoredTransaction, TransactionRecord, FRAUD_TYPE_SEPARATOR, NORMAL_FRAUD_TYPE,
    },
    types::Hour,
};
use serde::{Deserialize, Serialize};

// ── Rule table ───────────────────────────────────────────────────────────────

/// Predicate half of a rule. Total over well-formed records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    AmountAbove {
        threshold: f64,
    },
    AmountBelow {
        threshold: f64,
    },
    /// Exact payment type match combined with an amount floor.
    PaymentTypeAmountAbove {
        payment_type: String,
        threshold: f64,
    },
    /// Fires when the hour is before `start` or after `end`.
    HourOutside {
        start: Hour,
        end: Hour,
    },
    StoreIdContains {
        patterns: Vec<String>,
    },
    ProductIdContains {
        patterns: Vec<String>,
    },
}

impl Condition {
    pub fn matches(&self, record: &TransactionRecord, hour: Hour) -> bool {
        match self {
            Self::AmountAbove { threshold } => record.amount > *threshold,
            Self::AmountBelow { threshold } => record.amount < *threshold,
            Self::PaymentTypeAmountAbove {
                payment_type,
                threshold,
            } => record.payment_type == *payment_type && record.amount > *threshold,
            Self::HourOutside { start, end } => hour < *start || hour > *end,
            Self::StoreIdContains { patterns } => contains_any(&record.store_id, patterns),
            Self::ProductIdContains { patterns } => contains_any(&record.product_id, patterns),
        }
    }
}

fn contains_any(value: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| value.contains(p.as_str()))
}

/// One named, weighted heuristic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub tag: String,
    pub weight: f64,
    pub condition: Condition,
}

impl Rule {
    pub fn new(tag: impl Into<String>, weight: f64, condition: Condition) -> Self {
        Self {
            tag: tag.into(),
            weight,
            condition,
        }
    }
}

/// Deterministic half of a score: which rules fired and their summed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEvaluation<'a> {
    pub raw_score: f64,
    pub fired: Vec<&'a str>,
}

impl RuleEvaluation<'_> {
    pub fn fraud_type(&self) -> String {
        if self.fired.is_empty() {
            NORMAL_FRAUD_TYPE.to_string()
        } else {
            self.fired.join(FRAUD_TYPE_SEPARATOR)
        }
    }
}

// ── Scorer ───────────────────────────────────────────────────────────────────

pub struct Scorer {
    rules: Vec<Rule>,
    tiers: TierThresholds,
    amplitude: f64,
}

impl Scorer {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            tiers: config.tiers.clone(),
            amplitude: config.noise.amplitude,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run the rule table without any perturbation.
    pub fn evaluate(&self, record: &TransactionRecord) -> RuleEvaluation<'_> {
        let hour = record.hour();
        let mut raw_score = 0.0;
        let mut fired = Vec::new();

        for rule in &self.rules {
            if rule.condition.matches(record, hour) {
                raw_score += rule.weight;
                fired.push(rule.tag.as_str());
            }
        }

        RuleEvaluation { raw_score, fired }
    }

    /// Score one record with noise drawn from `rng`.
    pub fn score(&self, record: &TransactionRecord, rng: &mut ScoringRng) -> ScoredTransaction {
        let evaluation = self.evaluate(record);
        let noisy = evaluation.raw_score + rng.perturbation(self.amplitude);
        let fraud_score = noisy.clamp(0.0, 1.0);
        let risk_level = RiskLevel::from_score(fraud_score, &self.tiers);
        let fraud_type = evaluation.fraud_type();

        log::debug!(
            "scored {}: raw={:.2} final={:.3} tier={} rules=[{}]",
            record.transaction_id,
            evaluation.raw_score,
            fraud_score,
            risk_level,
            fraud_type
        );

        ScoredTransaction {
            record: record.clone(),
            fraud_score,
            risk_level,
            fraud_type,
        }
    }

    /// Score every record. Output has the same length and order as input.
    pub fn score_batch(
        &self,
        records: &[TransactionRecord],
        bank: &RngBank,
    ) -> Vec<ScoredTransaction> {
        records
            .iter()
            .map(|record| {
                let mut rng = bank.for_record(&record.transaction_id);
                self.score(record, &mut rng)
            })
            .collect()
    }

    pub fn tier_for(&self, score: f64) -> RiskLevel {
        RiskLevel::from_score(score, &self.tiers)
    }
}
