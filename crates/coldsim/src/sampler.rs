//! Random variate generation.
//!
//! The simulation only ever needs exponential variates, so the dependency is expressed
//! as a narrow trait and the RNG state is owned by the sampler instance instead of a
//! global. Seeding happens exactly once at construction, which makes runs reproducible.

use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg64;

/// A source of exponential variates.
pub trait Sampler {
    /// Draws a sample from Exponential(`rate`).
    fn exponential(&mut self, rate: f64) -> f64;
}

/// Production sampler backed by a seeded PCG-64 generator.
pub struct ExpSampler {
    rand: Pcg64,
}

impl ExpSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rand: Pcg64::seed_from_u64(seed),
        }
    }
}

impl Sampler for ExpSampler {
    fn exponential(&mut self, rate: f64) -> f64 {
        // Exp::new only fails for non-positive rates, which indicates a broken
        // function descriptor rather than a runtime condition.
        Exp::new(rate)
            .unwrap_or_else(|e| panic!("invalid exponential rate {}: {:?}", rate, e))
            .sample(&mut self.rand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ExpSampler::new(123);
        let mut b = ExpSampler::new(123);
        for _ in 0..100 {
            assert_eq!(a.exponential(2.0), b.exponential(2.0));
        }
    }

    #[test]
    fn samples_are_nonnegative() {
        let mut s = ExpSampler::new(42);
        for _ in 0..1000 {
            assert!(s.exponential(0.5) >= 0.0);
        }
    }
}
