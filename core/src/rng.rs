//! Random number generation for scoring noise, ingestion and sample data.
//!
//! RULE: Nothing in the scanner calls a platform RNG directly.
//! All randomness flows through ScoringRng instances derived from the
//! single master seed held by the RngBank. The master seed itself is the
//! only value ever drawn from entropy, and only in `NoiseMode::Random`.
//!
//! Each transaction gets its own RNG stream, seeded deterministically
//! from (master_seed XOR hash(transaction_id)). This means:
//!   - A record's perturbation does not depend on its position in the batch.
//!   - Any record's score is reproducible in isolation under a fixed seed.

use crate::config::{NoiseConfig, NoiseMode};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

const STREAM_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// A named, deterministic RNG for one record or one auxiliary stream.
pub struct ScoringRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
    noise_enabled: bool,
}

impl ScoringRng {
    /// Create an RNG from the master seed and a stable stream key.
    pub fn new(master_seed: u64, stream_key: u64) -> Self {
        let derived_seed = master_seed ^ stream_key.wrapping_mul(STREAM_MIX);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
            noise_enabled: true,
        }
    }

    /// Seeded RNG for a single stream, outside of any bank.
    pub fn seeded(seed: u64) -> Self {
        Self::new(seed, 0)
    }

    /// An RNG whose perturbation is always zero. Other draws still work,
    /// seeded from zero.
    pub fn disabled() -> Self {
        Self::new(0, 0).with_noise(false)
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_noise(mut self, enabled: bool) -> Self {
        self.noise_enabled = enabled;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Sample from a simplified Pareto distribution.
    /// x_min: minimum value, alpha: shape parameter (higher = less skewed).
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u = self.next_f64().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }

    /// Uniform draw in [-amplitude, +amplitude], or exactly 0.0 when
    /// noise is disabled.
    pub fn perturbation(&mut self, amplitude: f64) -> f64 {
        if !self.noise_enabled {
            return 0.0;
        }
        (self.next_f64() - 0.5) * 2.0 * amplitude
    }

    /// Uniform draw in [-half_width, +half_width], independent of the
    /// noise switch. Used for coordinate synthesis.
    pub fn jitter(&mut self, half_width: f64) -> f64 {
        (self.next_f64() - 0.5) * 2.0 * half_width
    }
}

/// Every RNG stream for a single analyzer, derived from one master seed.
#[derive(Debug, Clone)]
pub struct RngBank {
    master_seed: u64,
    noise_enabled: bool,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self {
            master_seed,
            noise_enabled: true,
        }
    }

    /// Bank that hands out RNGs with zero perturbation.
    pub fn disabled() -> Self {
        Self {
            master_seed: 0,
            noise_enabled: false,
        }
    }

    /// Build the bank described by the noise configuration.
    /// `NoiseMode::Random` draws a fresh master seed from entropy.
    pub fn from_config(noise: &NoiseConfig) -> Self {
        match noise.mode {
            NoiseMode::Random => Self::new(rand::random::<u64>()),
            NoiseMode::Seeded { seed } => Self::new(seed),
            NoiseMode::Disabled => Self::disabled(),
        }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn noise_enabled(&self) -> bool {
        self.noise_enabled
    }

    /// The stream used to perturb one transaction's score.
    pub fn for_record(&self, transaction_id: &str) -> ScoringRng {
        ScoringRng::new(self.master_seed, stable_hash(transaction_id))
            .with_name("record")
            .with_noise(self.noise_enabled)
    }

    pub fn for_stream(&self, slot: StreamSlot) -> ScoringRng {
        let key = stable_hash(slot.name()) ^ (slot as u64);
        ScoringRng::new(self.master_seed, key)
            .with_name(slot.name())
            .with_noise(self.noise_enabled)
    }
}

/// Stable auxiliary stream assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every auxiliary stream's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Ingest = 0,
    Sample = 1,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Sample => "sample",
        }
    }
}

/// FNV-1a over the key's bytes. Stable across platforms and releases,
/// unlike `std::collections::hash_map::DefaultHasher`.
fn stable_hash(key: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    key.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}
