//! CSV export of a scored batch.

use crate::{error::ScanResult, transaction::ScoredTransaction};
use std::io;

pub const REPORT_HEADERS: [&str; 9] = [
    "transactionId",
    "storeId",
    "productId",
    "paymentType",
    "amount",
    "timestamp",
    "fraudScore",
    "riskLevel",
    "fraudType",
];

/// One row per transaction, in batch order. Scores to 3 decimals.
pub fn write_scored_csv<W: io::Write>(writer: W, scored: &[ScoredTransaction]) -> ScanResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(REPORT_HEADERS)?;

    for txn in scored {
        let record = &txn.record;
        let fields = [
            record.transaction_id.clone(),
            record.store_id.clone(),
            record.product_id.clone(),
            record.payment_type.clone(),
            format!("{:.2}", record.amount),
            record.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            format!("{:.3}", txn.fraud_score),
            txn.risk_level.to_string(),
            txn.fraud_type.clone(),
        ];
        csv_writer.write_record(&fields)?;
    }

    csv_writer.flush()?;
    Ok(())
}
