//! fraudlens-core: heuristic fraud scoring and insight aggregation for
//! batches of retail transactions.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod report;
pub mod rng;
pub mod sample;
pub mod scoring;
pub mod summary;
pub mod transaction;
pub mod types;

pub use analyzer::{analyze, AnalysisResult, FraudAnalyzer};
pub use config::DetectionConfig;
pub use error::{ScanError, ScanResult};
pub use insights::{FraudInsight, Priority};
pub use transaction::{RiskLevel, ScoredTransaction, StoreLocation, TransactionRecord};
