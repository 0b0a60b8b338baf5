//! Shared primitive types used across the entire scanner.

/// A stable identifier for a transaction, store, or product.
pub type EntityId = String;

/// Hour of day on the transaction's wall clock, 0..=23.
pub type Hour = u32;
