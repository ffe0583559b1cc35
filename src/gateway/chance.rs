//! Sources of chance for simulated claim outcomes.

use uuid::Uuid;

/// Produces a uniform roll in `[0, 1)`.
pub trait ClaimChance: Send + Sync {
    fn roll(&self) -> f64;
}

/// Draws from the random bits of a fresh v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidChance;

impl ClaimChance for UuidChance {
    fn roll(&self) -> f64 {
        // low 53 bits sit clear of the version and variant fields
        let bits = (Uuid::new_v4().as_u128() as u64) & ((1u64 << 53) - 1);
        bits as f64 / (1u64 << 53) as f64
    }
}

/// Always returns the same roll.
#[derive(Debug, Clone, Copy)]
pub struct FixedChance(pub f64);

impl ClaimChance for FixedChance {
    fn roll(&self) -> f64 {
        self.0
    }
}
