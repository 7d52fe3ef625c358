#![allow(dead_code)]

use coldsim::sampler::Sampler;

pub fn assert_float_eq(x: f64, y: f64, eps: f64) {
    assert!(x > y - eps && x < y + eps);
}

/// Sampler returning a fixed value regardless of the rate, for deterministic tests.
pub struct FixedSampler {
    value: f64,
}

impl FixedSampler {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Sampler for FixedSampler {
    fn exponential(&mut self, _rate: f64) -> f64 {
        self.value
    }
}

/// Sampler replaying a scripted sequence of draws, then a large constant that pushes
/// any further events past the horizon of the test.
pub struct SequenceSampler {
    values: Vec<f64>,
    next: usize,
}

impl SequenceSampler {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }
}

impl Sampler for SequenceSampler {
    fn exponential(&mut self, _rate: f64) -> f64 {
        let value = self.values.get(self.next).copied().unwrap_or(1e12);
        self.next += 1;
        value
    }
}
