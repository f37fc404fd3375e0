//! RNG module - deterministic randomness for grid generation and refills
//!
//! The engine never reaches for global randomness: every random draw goes
//! through a [`RandomSource`], so a session seeded with the same value plays
//! out identically (useful for tests, replays and benchmarks).

/// Source of uniformly distributed integers
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    /// Random value in range [0, max). `max` must be non-zero.
    ///
    /// Uses the high bits of the generator (multiply-shift), which are far
    /// better distributed than the low bits of an LCG.
    fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0, "next_range called with max = 0");
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
