//! CSV ingestion — raw rows to validated TransactionRecords.
//!
//! This is the caller-side layer that enforces the analyzer's
//! preconditions. It:
//!   1. Reads header-keyed rows and drops rows with no data at all
//!   2. Validates required fields, amounts and timestamps, capping the
//!      number of reported messages
//!   3. Normalizes column spellings (camelCase, PascalCase, snake_case)
//!   4. Synthesizes a store location when the source has none
//!
//! Nothing reaches the analyzer if any row fails validation.

use crate::{
    config::IngestConfig,
    error::{ScanError, ScanResult},
    rng::ScoringRng,
    transaction::{StoreLocation, TransactionRecord},
};
use chrono::{DateTime, NaiveDateTime};
use std::collections::HashMap;
use std::io;
use std::path::Path;

// ── Column aliases ───────────────────────────────────────────────────────────

const TRANSACTION_ID: &[&str] = &["transactionId", "TransactionID", "transaction_id"];
const STORE_ID: &[&str] = &["storeId", "StoreID", "store_id"];
const PRODUCT_ID: &[&str] = &["productId", "ProductID", "product_id"];
const PAYMENT_TYPE: &[&str] = &["paymentType", "PaymentType", "payment_type"];
const AMOUNT: &[&str] = &["amount", "Amount"];
const TIMESTAMP: &[&str] = &["timestamp", "Timestamp"];
const LATITUDE: &[&str] = &["latitude", "Latitude", "lat"];
const LONGITUDE: &[&str] = &["longitude", "Longitude", "lng"];
const STORE_LOCATION: &[&str] = &["storeLocation", "StoreLocation", "store_location"];

/// Accepted layouts for timestamps without an explicit offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// ── Raw rows ─────────────────────────────────────────────────────────────────

/// One CSV row keyed by header name, before any interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow(pub HashMap<String, String>);

impl RawRow {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// First non-blank value among the given column spellings.
    pub fn get(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.0.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

/// Read every non-blank row from a headed CSV source.
///
/// Short rows are kept: cells past the end of a row are simply absent,
/// so validation reports them per row instead of failing the read.
pub fn read_rows<R: io::Read>(reader: R) -> ScanResult<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let row = RawRow(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.to_string(), cell.to_string()))
                .collect(),
        );
        if !row.is_blank() {
            rows.push(row);
        }
    }
    Ok(rows)
}

// ── Validation ───────────────────────────────────────────────────────────────

/// Per-row problems, 1-based row numbers, at most `max_errors` messages.
pub fn validate_rows(rows: &[RawRow], max_errors: usize) -> Vec<String> {
    let mut errors = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let line = index + 1;

        if row.get(TRANSACTION_ID).is_none() {
            errors.push(format!("Row {line}: Missing transactionId"));
        }
        if row.get(STORE_ID).is_none() {
            errors.push(format!("Row {line}: Missing storeId"));
        }
        if row.get(PRODUCT_ID).is_none() {
            errors.push(format!("Row {line}: Missing productId"));
        }
        match row.get(AMOUNT) {
            None => errors.push(format!("Row {line}: Missing amount")),
            Some(raw) if parse_amount(raw).is_none() => {
                errors.push(format!("Row {line}: Invalid amount"))
            }
            Some(_) => {}
        }
        match row.get(TIMESTAMP) {
            None => errors.push(format!("Row {line}: Missing timestamp")),
            Some(raw) if parse_timestamp(raw).is_none() => {
                errors.push(format!("Row {line}: Invalid timestamp"))
            }
            Some(_) => {}
        }

        if errors.len() >= max_errors {
            break;
        }
    }

    errors.truncate(max_errors);
    errors
}

/// Finite and non-negative, or nothing.
pub fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite() && *a >= 0.0)
}

/// RFC 3339 (wall clock of its own offset) or one of the naive layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

// ── Normalization ────────────────────────────────────────────────────────────

/// Build records from rows that already passed `validate_rows`.
pub fn normalize_rows(
    rows: &[RawRow],
    config: &IngestConfig,
    rng: &mut ScoringRng,
) -> ScanResult<Vec<TransactionRecord>> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index + 1, row, config, rng))
        .collect()
}

fn normalize_row(
    line: usize,
    row: &RawRow,
    config: &IngestConfig,
    rng: &mut ScoringRng,
) -> ScanResult<TransactionRecord> {
    let required = |aliases: &[&str], field: &str| {
        row.get(aliases)
            .map(str::to_string)
            .ok_or_else(|| rejected(format!("Row {line}: Missing {field}")))
    };

    let transaction_id = required(TRANSACTION_ID, "transactionId")?;
    let store_id = required(STORE_ID, "storeId")?;
    let product_id = required(PRODUCT_ID, "productId")?;
    let amount = row
        .get(AMOUNT)
        .and_then(parse_amount)
        .ok_or_else(|| rejected(format!("Row {line}: Invalid amount")))?;
    let timestamp = row
        .get(TIMESTAMP)
        .and_then(parse_timestamp)
        .ok_or_else(|| rejected(format!("Row {line}: Invalid timestamp")))?;
    let payment_type = row
        .get(PAYMENT_TYPE)
        .unwrap_or(config.default_payment_type.as_str())
        .to_string();

    let location = StoreLocation {
        lat: coordinate(row, LATITUDE)
            .unwrap_or_else(|| config.fallback_lat + rng.jitter(config.jitter_degrees)),
        lng: coordinate(row, LONGITUDE)
            .unwrap_or_else(|| config.fallback_lng + rng.jitter(config.jitter_degrees)),
        name: row
            .get(STORE_LOCATION)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Store {store_id}")),
    };

    Ok(TransactionRecord::new(
        transaction_id,
        store_id,
        product_id,
        payment_type,
        amount,
        timestamp,
    )
    .with_location(location))
}

/// Zero counts as missing: blank coordinate cells often export as 0.
fn coordinate(row: &RawRow, aliases: &[&str]) -> Option<f64> {
    row.get(aliases)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|c| c.is_finite() && *c != 0.0)
}

fn rejected(message: String) -> ScanError {
    ScanError::Validation {
        errors: vec![message],
    }
}

// ── Entry points ─────────────────────────────────────────────────────────────

/// Read, validate and normalize a CSV source.
/// Returns `ScanError::Validation` with the capped messages on any failure.
pub fn load_csv<R: io::Read>(
    reader: R,
    config: &IngestConfig,
    rng: &mut ScoringRng,
) -> ScanResult<Vec<TransactionRecord>> {
    let rows = read_rows(reader)?;
    let errors = validate_rows(&rows, config.max_validation_errors);
    if !errors.is_empty() {
        log::warn!(
            "ingest rejected {} rows: {} validation error(s) reported",
            rows.len(),
            errors.len()
        );
        return Err(ScanError::Validation { errors });
    }

    let records = normalize_rows(&rows, config, rng)?;
    log::info!("ingest accepted {} transactions", records.len());
    Ok(records)
}

pub fn load_csv_file(
    path: &Path,
    config: &IngestConfig,
    rng: &mut ScoringRng,
) -> ScanResult<Vec<TransactionRecord>> {
    let file = std::fs::File::open(path)?;
    load_csv(io::BufReader::new(file), config, rng)
}
