//! Deterministic sample transaction generation using curated catalogues.
//!
//! Produces demo batches that exercise every stock rule: flagged stores,
//! gift-card and return products, large cash sales, off-hours activity
//! and sub-dollar amounts. Same RNG seed = same batch.

use crate::{
    rng::ScoringRng,
    transaction::{StoreLocation, TransactionRecord},
};
use chrono::{Days, NaiveDate};

const SAMPLE_DAYS: u64 = 7;
const MICRO_AMOUNT_CHANCE: f64 = 0.02;
const AMOUNT_CAP: f64 = 5_000.0;

pub struct SampleGenerator;

impl SampleGenerator {
    /// Generate `count` transactions with ids TXN000001, TXN000002, ...
    pub fn generate(count: usize, rng: &mut ScoringRng) -> Vec<TransactionRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap_or_default();

        (1..=count)
            .map(|n| {
                let (store_id, name, lat, lng) = Self::pick(rng, Self::stores());
                let product_id = *Self::pick(rng, Self::products());
                let payment_type = *Self::pick(rng, Self::payment_types());

                let amount = if rng.chance(MICRO_AMOUNT_CHANCE) {
                    (rng.next_f64() * 100.0).floor() / 100.0
                } else {
                    let raw = rng.pareto(15.0, 1.4).min(AMOUNT_CAP);
                    (raw * 100.0).round() / 100.0
                };

                let day = start + Days::new(rng.next_u64_below(SAMPLE_DAYS));
                let hour = rng.next_u64_below(24) as u32;
                let minute = rng.next_u64_below(60) as u32;
                let timestamp = day.and_hms_opt(hour, minute, 0).unwrap_or_default();

                TransactionRecord::new(
                    format!("TXN{n:06}"),
                    *store_id,
                    product_id,
                    payment_type,
                    amount,
                    timestamp,
                )
                .with_location(StoreLocation {
                    lat: *lat,
                    lng: *lng,
                    name: name.to_string(),
                })
            })
            .collect()
    }

    fn pick<'a, T>(rng: &mut ScoringRng, items: &'a [T]) -> &'a T {
        let index = rng.next_u64_below(items.len() as u64) as usize;
        &items[index]
    }

    /// (store id, display name, latitude, longitude)
    fn stores() -> &'static [(&'static str, &'static str, f64, f64)] {
        &[
            ("ST001", "New York Store", 40.7128, -74.0060),
            ("ST002", "Los Angeles Store", 34.0522, -118.2437),
            ("ST003", "Chicago Store", 41.8781, -87.6298),
            ("ST004", "Houston Store", 29.7604, -95.3698),
            ("ST005", "Phoenix Store", 33.4484, -112.0740),
        ]
    }

    fn products() -> &'static [&'static str] {
        &[
            "PRD001", "PRD002", "PRD003", "PRD004", "PRD005", "PRD006", "PRD007", "PRD008",
            "PRD009", "PRD010", "PRD011", "PRD012", "PRD013", "PRD014", "PRD015", "PRD016",
            "GIFT01", "GIFT02", "RETURN01",
        ]
    }

    fn payment_types() -> &'static [&'static str] {
        &["Credit Card", "Debit Card", "Cash", "Mobile Payment"]
    }
}
