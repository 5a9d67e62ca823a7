//! Coherent 2D noise sources

use ::noise::{NoiseFn, Perlin};

use crate::constants::sampling::{LATTICE_SHIFT, PERLIN_TABLE_SEED};

/// Deterministic 2D coherent noise.
///
/// Implementations must be pure: the same (x, z) always yields the same
/// value, roughly in [0,1], with no internal state.
pub trait NoiseSampler: Send + Sync {
    fn sample(&self, x: f32, z: f32) -> f32;
}

/// Gradient noise backed by the `noise` crate's Perlin table
#[derive(Clone)]
pub struct PerlinSampler {
    perlin: Perlin,
}

impl PerlinSampler {
    pub fn new() -> Self {
        Self::with_table_seed(PERLIN_TABLE_SEED)
    }

    /// Use a different permutation table
    pub fn with_table_seed(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }
}

impl Default for PerlinSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSampler for PerlinSampler {
    fn sample(&self, x: f32, z: f32) -> f32 {
        // Perlin is exactly 0 on the integer lattice; shift off it
        let value = self
            .perlin
            .get([x as f64 + LATTICE_SHIFT, z as f64 + LATTICE_SHIFT]);

        ((value + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}
