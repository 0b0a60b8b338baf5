//! Insight aggregation — batch-level findings over scored transactions.
//!
//! This module:
//!   1. Groups the scored batch by store, payment type and time of day
//!      in a single pass (BatchStats)
//!   2. Flags stores whose High-risk ratio exceeds the store threshold
//!   3. Names the payment type with the highest High-risk ratio
//!   4. Names the time-of-day bucket with the highest High-risk ratio
//!   5. Flags a batch-wide High-risk ratio above the overall threshold
//!
//! Output order follows the pass order. Every pass is pure, so the same
//! scored batch always yields the same insights.

use crate::{
    config::InsightThresholds,
    transaction::ScoredTransaction,
    types::Hour,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FraudInsight {
    #[serde(rename = "type")]
    pub insight_type: String,
    pub description: String,
    pub impact: String,
    pub recommendation: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
}

impl TimeBucket {
    pub fn from_hour(hour: Hour) -> Self {
        if hour < 12 {
            Self::Morning
        } else if hour < 18 {
            Self::Afternoon
        } else {
            Self::Evening
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of transactions and of High-risk transactions in one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub total: usize,
    pub high_risk: usize,
}

impl GroupStats {
    fn record(&mut self, high_risk: bool) {
        self.total += 1;
        if high_risk {
            self.high_risk += 1;
        }
    }

    /// High-risk share of the group; 0.0 for an empty group.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.high_risk as f64 / self.total as f64
        }
    }
}

/// Key → GroupStats, iterated in first-encounter order.
#[derive(Debug, Clone)]
pub struct Grouping<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, GroupStats)>,
}

impl<K> Default for Grouping<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + std::hash::Hash> Grouping<K> {
    fn record(&mut self, key: &K, high_risk: bool) {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), GroupStats::default()));
                self.index.insert(key.clone(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.record(high_risk);
    }

    pub fn get(&self, key: &K) -> Option<&GroupStats> {
        self.index.get(key).map(|&slot| &self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &GroupStats)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Group with the highest ratio. Ties go to the first encountered.
    pub fn riskiest(&self) -> Option<(&K, &GroupStats)> {
        let mut best: Option<(&K, &GroupStats)> = None;
        for (key, stats) in self.iter() {
            match best {
                Some((_, top)) if stats.ratio() <= top.ratio() => {}
                _ => best = Some((key, stats)),
            }
        }
        best
    }
}

/// Every grouping the insight passes need, built in one scan.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub by_store: Grouping<String>,
    pub by_payment_type: Grouping<String>,
    pub by_time_bucket: Grouping<TimeBucket>,
    pub overall: GroupStats,
}

impl BatchStats {
    pub fn collect(scored: &[ScoredTransaction]) -> Self {
        let mut stats = Self::default();
        for txn in scored {
            let high = txn.is_high_risk();
            stats.by_store.record(&txn.record.store_id, high);
            stats.by_payment_type.record(&txn.record.payment_type, high);
            stats
                .by_time_bucket
                .record(&TimeBucket::from_hour(txn.record.hour()), high);
            stats.overall.record(high);
        }
        stats
    }
}

// ── Aggregator ───────────────────────────────────────────────────────────────

pub struct InsightAggregator {
    thresholds: InsightThresholds,
}

impl InsightAggregator {
    pub fn new(thresholds: InsightThresholds) -> Self {
        Self { thresholds }
    }

    pub fn aggregate(&self, scored: &[ScoredTransaction]) -> Vec<FraudInsight> {
        if scored.is_empty() {
            return Vec::new();
        }

        let stats = BatchStats::collect(scored);
        self.insights_from_stats(&stats)
    }

    pub fn insights_from_stats(&self, stats: &BatchStats) -> Vec<FraudInsight> {
        let mut insights = Vec::new();

        // 1. Store risk
        insights.extend(self.store_risk(stats));

        // 2. Payment method risk
        insights.extend(self.payment_type_risk(stats));

        // 3. Time-of-day pattern
        insights.extend(self.temporal_pattern(stats));

        // 4. Overall environment
        insights.extend(self.overall_risk(stats));

        insights
    }

    /// Stores whose High ratio strictly exceeds the store threshold,
    /// in first-encounter order.
    pub fn flagged_stores<'a>(&self, stats: &'a BatchStats) -> Vec<&'a str> {
        stats
            .by_store
            .iter()
            .filter(|(_, s)| s.ratio() > self.thresholds.store_fraud_ratio)
            .map(|(store, _)| store.as_str())
            .collect()
    }

    fn store_risk(&self, stats: &BatchStats) -> Option<FraudInsight> {
        let flagged = self.flagged_stores(stats);
        if flagged.is_empty() {
            return None;
        }

        let listed: Vec<&str> = flagged
            .iter()
            .take(self.thresholds.max_listed_stores)
            .copied()
            .collect();

        Some(FraudInsight {
            insight_type: "High-Risk Store Alert".into(),
            description: format!(
                "{} stores show elevated fraud rates above {}%. Stores {} require immediate attention.",
                flagged.len(),
                format_threshold_pct(self.thresholds.store_fraud_ratio),
                listed.join(", ")
            ),
            impact: "Potential revenue loss and compliance risk".into(),
            recommendation:
                "Implement enhanced monitoring and staff training for flagged locations".into(),
            priority: Priority::High,
        })
    }

    fn payment_type_risk(&self, stats: &BatchStats) -> Option<FraudInsight> {
        let (payment_type, group) = stats.by_payment_type.riskiest()?;

        Some(FraudInsight {
            insight_type: "Payment Method Risk Pattern".into(),
            description: format!(
                "{} transactions show a {:.1}% fraud rate, significantly above baseline.",
                payment_type,
                group.ratio() * 100.0
            ),
            impact: "Systematic payment fraud vulnerability".into(),
            recommendation:
                "Review and strengthen payment verification processes for this method".into(),
            priority: Priority::Medium,
        })
    }

    fn temporal_pattern(&self, stats: &BatchStats) -> Option<FraudInsight> {
        let (bucket, group) = stats.by_time_bucket.riskiest()?;

        Some(FraudInsight {
            insight_type: "Temporal Fraud Pattern".into(),
            description: format!(
                "{} hours show the highest concentration of suspicious activities with {} fraud cases.",
                bucket, group.high_risk
            ),
            impact: "Time-specific vulnerability window".into(),
            recommendation:
                "Increase security measures and monitoring during peak fraud hours".into(),
            priority: Priority::Medium,
        })
    }

    fn overall_risk(&self, stats: &BatchStats) -> Option<FraudInsight> {
        let ratio = stats.overall.ratio();
        if stats.overall.total == 0 || ratio <= self.thresholds.overall_fraud_ratio {
            return None;
        }

        Some(FraudInsight {
            insight_type: "Elevated Fraud Risk Environment".into(),
            description: format!(
                "Current fraud detection rate of {:.1}% exceeds industry benchmark of {}.",
                ratio * 100.0,
                self.thresholds.benchmark_label
            ),
            impact: "Significant financial and reputational risk".into(),
            recommendation:
                "Implement comprehensive fraud prevention strategy across all channels".into(),
            priority: Priority::High,
        })
    }
}

/// 0.30 → "30", 0.125 → "12.5".
fn format_threshold_pct(ratio: f64) -> String {
    let pct = ratio * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{}", pct.round() as i64)
    } else {
        format!("{pct:.1}")
    }
}
