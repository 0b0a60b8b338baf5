//! Read-only summaries over a scored batch, for dashboards and reports.

use crate::{
    insights::{BatchStats, GroupStats, Grouping},
    transaction::{RiskLevel, ScoredTransaction},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    /// Sum of amounts over High-risk transactions.
    pub high_risk_amount: f64,
    /// High-risk share of the batch, in percent. 0 for an empty batch.
    pub fraud_rate_pct: f64,
}

impl BatchSummary {
    pub fn from_scored(scored: &[ScoredTransaction]) -> Self {
        let mut summary = Self {
            total: scored.len(),
            ..Self::default()
        };

        for txn in scored {
            match txn.risk_level {
                RiskLevel::High => {
                    summary.high_risk += 1;
                    summary.high_risk_amount += txn.record.amount;
                }
                RiskLevel::Medium => summary.medium_risk += 1,
                RiskLevel::Low => summary.low_risk += 1,
            }
        }

        if summary.total > 0 {
            summary.fraud_rate_pct = summary.high_risk as f64 / summary.total as f64 * 100.0;
        }
        summary
    }
}

/// Risk figures for one store or payment type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupRisk {
    pub key: String,
    pub total: usize,
    pub high_risk: usize,
    pub rate_pct: f64,
}

impl GroupRisk {
    fn new(key: &str, stats: &GroupStats) -> Self {
        Self {
            key: key.to_string(),
            total: stats.total,
            high_risk: stats.high_risk,
            rate_pct: stats.ratio() * 100.0,
        }
    }
}

/// Payment type with the highest High-risk ratio; ties go to the first seen.
pub fn riskiest_payment_type(scored: &[ScoredTransaction]) -> Option<GroupRisk> {
    riskiest(&BatchStats::collect(scored).by_payment_type)
}

/// Store with the highest High-risk ratio; ties go to the first seen.
pub fn riskiest_store(scored: &[ScoredTransaction]) -> Option<GroupRisk> {
    riskiest(&BatchStats::collect(scored).by_store)
}

/// Every store in first-encounter order.
pub fn store_risk_table(scored: &[ScoredTransaction]) -> Vec<GroupRisk> {
    BatchStats::collect(scored)
        .by_store
        .iter()
        .map(|(store, stats)| GroupRisk::new(store, stats))
        .collect()
}

fn riskiest(grouping: &Grouping<String>) -> Option<GroupRisk> {
    grouping
        .riskiest()
        .map(|(key, stats)| GroupRisk::new(key, stats))
}
