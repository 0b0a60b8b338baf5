//! CSV ingestion tests: column aliases, validation messages, the error cap,
//! location synthesis, and the hand-off into analyze.

use chrono::Timelike;
use fraudlens_core::{
    analyze,
    config::IngestConfig,
    ingest::{self, RawRow},
    rng::ScoringRng,
    DetectionConfig, RiskLevel, ScanError,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

const SAMPLE_CSV: &str = "\
transactionId,storeId,employeeId,storeLocation,productId,productCategory,paymentType,amount,refundRequested,customerId,timestamp,latitude,longitude
TXN001,ST001,EMP001,New York Store,PRD001,Electronics,Credit Card,299.99,false,CUST001,2024-06-07T10:30:00Z,40.7128,-74.0060
TXN002,ST002,EMP002,Los Angeles Store,PRD002,Clothing,Cash,89.50,false,CUST002,2024-06-07T11:15:00Z,34.0522,-118.2437
TXN003,ST001,EMP003,New York Store,PRD003,Home & Garden,Debit Card,150.75,true,CUST003,2024-06-07T12:00:00Z,40.7128,-74.0060
TXN004,ST003,EMP004,Chicago Store,PRD004,Books,Credit Card,45.99,false,CUST004,2024-06-07T13:30:00Z,41.8781,-87.6298
TXN005,ST002,EMP005,Los Angeles Store,PRD005,Electronics,Mobile Payment,799.99,false,CUST005,2024-06-07T14:45:00Z,34.0522,-118.2437
";

fn load(csv: &str) -> Result<Vec<fraudlens_core::TransactionRecord>, ScanError> {
    ingest::load_csv(
        csv.as_bytes(),
        &IngestConfig::default(),
        &mut ScoringRng::seeded(1),
    )
}

fn validation_errors(csv: &str) -> Vec<String> {
    match load(csv) {
        Err(ScanError::Validation { errors }) => errors,
        other => panic!("Expected validation failure, got {other:?}"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn sample_csv_loads_every_row() {
    let records = load(SAMPLE_CSV).expect("sample CSV should load");
    assert_eq!(records.len(), 5);

    let first = &records[0];
    assert_eq!(first.transaction_id, "TXN001");
    assert_eq!(first.store_id, "ST001");
    assert_eq!(first.product_id, "PRD001");
    assert_eq!(first.payment_type, "Credit Card");
    assert!((first.amount - 299.99).abs() < 1e-9);
    assert_eq!(first.hour(), 10);
    assert_eq!(first.timestamp.minute(), 30);

    let location = first.store_location.as_ref().expect("location");
    assert_eq!(location.name, "New York Store");
    assert!((location.lat - 40.7128).abs() < 1e-9);
    assert!((location.lng + 74.0060).abs() < 1e-9);
}

#[test]
fn pascal_case_headers_are_accepted() {
    let csv = "\
TransactionID,StoreID,ProductID,PaymentType,Amount,Timestamp
T-1,ST007,GIFT99,Cash,12.00,2024-06-07 23:05:00
";
    let records = load(csv).expect("PascalCase CSV should load");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].transaction_id, "T-1");
    assert_eq!(records[0].product_id, "GIFT99");
    assert_eq!(records[0].hour(), 23);
}

#[test]
fn missing_fields_are_reported_per_row() {
    let csv = "\
transactionId,storeId,productId,paymentType,amount,timestamp
,ST001,PRD001,Cash,10,2024-06-07T10:00:00
TXN2,,,Cash,,2024-06-07T10:00:00
TXN3,ST001,PRD001,Cash,10,
";
    let errors = validation_errors(csv);
    assert_eq!(
        errors,
        vec![
            "Row 1: Missing transactionId",
            "Row 2: Missing storeId",
            "Row 2: Missing productId",
            "Row 2: Missing amount",
            "Row 3: Missing timestamp",
        ]
    );
}

#[test]
fn bad_amounts_and_timestamps_are_rejected() {
    let csv = "\
transactionId,storeId,productId,paymentType,amount,timestamp
TXN1,ST001,PRD001,Cash,-5,2024-06-07T10:00:00
TXN2,ST001,PRD001,Cash,abc,2024-06-07T10:00:00
TXN3,ST001,PRD001,Cash,10,yesterday
TXN4,ST001,PRD001,Cash,10,2024-06-07
";
    let errors = validation_errors(csv);
    assert_eq!(
        errors,
        vec![
            "Row 1: Invalid amount",
            "Row 2: Invalid amount",
            "Row 3: Invalid timestamp",
            "Row 4: Invalid timestamp",
        ]
    );
}

#[test]
fn validation_messages_capped_at_ten() {
    let mut csv = String::from("transactionId,storeId,productId,paymentType,amount,timestamp\n");
    for i in 0..25 {
        csv.push_str(&format!("TXN{i},ST001,PRD001,Cash,-1,2024-06-07T10:00:00\n"));
    }

    let errors = validation_errors(&csv);
    assert_eq!(errors.len(), 10);
    assert_eq!(errors[0], "Row 1: Invalid amount");
    assert_eq!(errors[9], "Row 10: Invalid amount");
}

#[test]
fn blank_rows_are_skipped() {
    let csv = "\
transactionId,storeId,productId,paymentType,amount,timestamp
TXN1,ST001,PRD001,Cash,10,2024-06-07T10:00:00
,,,,,
TXN2,ST002,PRD002,Cash,20,2024-06-07T11:00:00
";
    let records = load(csv).expect("blank rows should not fail validation");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].transaction_id, "TXN2");
}

#[test]
fn missing_payment_type_and_location_are_filled_in() {
    let csv = "\
transactionId,storeId,productId,amount,timestamp
TXN1,ST009,PRD001,10,2024-06-07T10:00:00
";
    let config = IngestConfig::default();
    let records = load(csv).expect("minimal CSV should load");
    let txn = &records[0];

    assert_eq!(txn.payment_type, "Credit Card");

    let location = txn.store_location.as_ref().expect("synthesized location");
    assert_eq!(location.name, "Store ST009");
    assert!((location.lat - config.fallback_lat).abs() <= config.jitter_degrees);
    assert!((location.lng - config.fallback_lng).abs() <= config.jitter_degrees);
}

#[test]
fn offset_timestamps_keep_their_wall_clock_hour() {
    let parsed = ingest::parse_timestamp("2024-06-07T03:30:00+05:00").unwrap();
    assert_eq!(parsed.hour(), 3);

    let parsed = ingest::parse_timestamp("2024-06-07 21:59").unwrap();
    assert_eq!(parsed.hour(), 21);

    assert!(ingest::parse_timestamp("07/06/2024").is_none());
}

#[test]
fn raw_row_prefers_first_non_blank_alias() {
    let row = RawRow::from_pairs([("transactionId", "  "), ("TransactionID", "TXN-9")]);
    assert_eq!(row.get(&["transactionId", "TransactionID"]), Some("TXN-9"));
    assert!(!row.is_blank());
    assert!(RawRow::from_pairs([("a", ""), ("b", " ")]).is_blank());
}

#[test]
fn short_row_without_optional_cells_loads() {
    let csv = "\
transactionId,storeId,productId,paymentType,amount,timestamp,latitude,longitude
TXN1,ST002,PRD001,Cash,10,2024-06-07T10:00:00,34.0522,-118.2437
TXN2,ST004,PRD002,Cash,20,2024-06-07T11:00:00
";
    let records = load(csv).expect("row without coordinates should load");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].transaction_id, "TXN2");
    assert_eq!(records[1].hour(), 11);

    let location = records[1].store_location.as_ref().expect("synthesized location");
    assert_eq!(location.name, "Store ST004");
}

#[test]
fn short_row_missing_required_cell_is_reported() {
    let csv = "\
transactionId,storeId,productId,paymentType,amount,timestamp,latitude,longitude
TXN1,ST002,PRD001,Cash,10,2024-06-07T10:00:00,34.0522,-118.2437
TXN2,ST002,PRD002,Cash,20
";
    let errors = validation_errors(csv);
    assert_eq!(errors, vec!["Row 2: Missing timestamp"]);
}

#[test]
fn slash_dated_timestamps_are_accepted() {
    let parsed = ingest::parse_timestamp("2024/06/07 10:30").unwrap();
    assert_eq!((parsed.hour(), parsed.minute()), (10, 30));

    let parsed = ingest::parse_timestamp("06/07/2024 23:15:00").unwrap();
    assert_eq!(parsed.hour(), 23);
    assert_eq!(parsed.date(), chrono::NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
}

/// End to end: the sample CSV through analyze with noise disabled.
#[test]
fn loaded_sample_analyzes_as_expected() {
    let records = load(SAMPLE_CSV).unwrap();
    let result = analyze(&records, &DetectionConfig::default_test());

    let types: Vec<&str> = result.scored.iter().map(|t| t.fraud_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["High-Risk Store", "Normal", "High-Risk Store", "High-Risk Store", "Normal"]
    );
    assert!(result.scored.iter().all(|t| t.risk_level == RiskLevel::Low));

    let descriptions: Vec<&str> = result.insights.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(
        descriptions,
        vec![
            "Credit Card transactions show a 0.0% fraud rate, significantly above baseline.",
            "Morning hours show the highest concentration of suspicious activities with 0 fraud cases.",
        ]
    );
}
