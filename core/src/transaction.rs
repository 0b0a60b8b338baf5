//! Transaction records as handed in by the ingestion layer, and their
//! scored counterparts.

use crate::{
    config::TierThresholds,
    types::{EntityId, Hour},
};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `fraud_type` value when no rule fired.
pub const NORMAL_FRAUD_TYPE: &str = "Normal";

/// Separator between rule tags in `fraud_type`.
pub const FRAUD_TYPE_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreLocation {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

/// One normalized transaction. Immutable once built by the caller.
///
/// Callers guarantee non-empty ids and a finite, non-negative amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub transaction_id: EntityId,
    pub store_id: EntityId,
    pub product_id: EntityId,
    pub payment_type: String,
    pub amount: f64,
    /// Wall-clock time as written in the source data.
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_location: Option<StoreLocation>,
}

impl TransactionRecord {
    pub fn new(
        transaction_id: impl Into<EntityId>,
        store_id: impl Into<EntityId>,
        product_id: impl Into<EntityId>,
        payment_type: impl Into<String>,
        amount: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            store_id: store_id.into(),
            product_id: product_id.into(),
            payment_type: payment_type.into(),
            amount,
            timestamp,
            store_location: None,
        }
    }

    pub fn with_location(mut self, location: StoreLocation) -> Self {
        self.store_location = Some(location);
        self
    }

    pub fn hour(&self) -> Hour {
        self.timestamp.hour()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bands are closed on their upper bound: a score equal to a
    /// threshold falls into the lower tier.
    pub fn from_score(score: f64, tiers: &TierThresholds) -> Self {
        if score > tiers.high {
            Self::High
        } else if score > tiers.medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transaction plus its score. Created once per batch, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTransaction {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub fraud_score: f64,
    pub risk_level: RiskLevel,
    pub fraud_type: String,
}

impl ScoredTransaction {
    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }

    /// Rule tags that fired, in rule-table order. Empty for "Normal".
    pub fn fraud_tags(&self) -> Vec<&str> {
        if self.fraud_type == NORMAL_FRAUD_TYPE {
            return Vec::new();
        }
        self.fraud_type.split(FRAUD_TYPE_SEPARATOR).collect()
    }
}
