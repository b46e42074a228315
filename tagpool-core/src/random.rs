//! Uniform random sources for sampling.
//!
//! Sampling only needs "a float in `[0, 1)` on demand". Any [`rand::RngCore`]
//! qualifies: a seeded `StdRng` for reproducible rolls, `thread_rng()` for
//! casual use, or `OsRng` when draws must come from a secure source.

use rand::{Rng, RngCore};

/// Produces floats uniformly distributed in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore + ?Sized> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        // Standard distribution for f64 is [0, 1).
        self.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl FixedDraws {
    /// An empty list replays `0.0`.
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }
}

impl UniformSource for FixedDraws {
    fn next_uniform(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor = (self.cursor + 1) % self.draws.len();
        draw
    }
}
