//! Estimators built on simulation output.

use serde::Serialize;

use crate::function::{FunctionCounters, FunctionRegistry};

/// Large-sample 97.5% normal quantile used for two-sided 95% confidence intervals.
/// With the typical number of functions (~10^4) the Student-t distribution is
/// indistinguishable from the normal, so a fixed critical value is used.
pub const Z_95: f64 = 1.959963984540054;

/// A collected sample of observations.
#[derive(Clone, Default)]
pub struct SampleMetric {
    data: Vec<f64>,
}

impl SampleMetric {
    pub fn add(&mut self, x: f64) {
        self.data.push(x);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn mean(&self) -> f64 {
        self.sum() / (self.data.len() as f64)
    }

    /// Bessel-corrected sample variance. Requires at least two observations.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        let sq: f64 = self.data.iter().map(|x| (x - mean) * (x - mean)).sum();
        sq / ((self.data.len() - 1) as f64)
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Treats each observation as one i.i.d. draw and builds `mean ± z*s/sqrt(N)`.
    /// Returns `None` for fewer than two observations.
    pub fn confidence_interval(&self, z: f64) -> Option<ConfidenceInterval> {
        if self.data.len() < 2 {
            return None;
        }
        let mean = self.mean();
        let half_width = z * self.std_dev() / (self.data.len() as f64).sqrt();
        Some(ConfidenceInterval {
            mean,
            lower: mean - half_width,
            upper: mean + half_width,
            samples: self.data.len(),
        })
    }
}

/// A two-sided confidence interval around a sample mean.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    /// Number of observations the interval was built from.
    pub samples: usize,
}

/// Aggregate counter totals at a point in simulated time, for periodic observation logs.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct StateSnapshot {
    pub time: f64,
    pub requests: u64,
    pub cold_starts: u64,
    pub promotions: u64,
    pub completions: u64,
    pub rejections: u64,
}

impl StateSnapshot {
    pub fn new(time: f64, totals: &FunctionCounters) -> Self {
        Self {
            time,
            requests: totals.requests,
            cold_starts: totals.cold_starts,
            promotions: totals.promotions,
            completions: totals.completions,
            rejections: totals.rejections,
        }
    }
}

/// Estimates of the cold-start probability and the loss rate over a completed run.
///
/// The pooled estimators divide one aggregate by another and thus weigh functions by
/// their request volume; the cross-sectional estimators treat each function's own
/// ratio as one observation across N functions. The two differ systematically and are
/// both exposed.
#[derive(Clone, Debug, Serialize)]
pub struct Estimates {
    /// Elapsed simulated time the counters cover (after any warm-up trim).
    pub elapsed: f64,
    /// Aggregate counter totals.
    pub totals: FunctionCounters,
    /// Pooled cold-start ratio `sum(cold_starts) / sum(requests)`.
    pub pooled_cold_start_ratio: f64,
    /// Pooled loss rate `sum(rejections) / elapsed`, per simulated second.
    pub pooled_loss_rate: f64,
    /// Cross-sectional cold-start ratio over per-function observations, functions
    /// with zero requests excluded.
    pub cold_start_ratio: Option<ConfidenceInterval>,
    /// Cross-sectional loss rate over per-function observations.
    pub loss_rate: Option<ConfidenceInterval>,
}

impl Estimates {
    /// Builds estimates from per-function counters over `elapsed` simulated seconds.
    pub fn collect(registry: &FunctionRegistry, elapsed: f64) -> Self {
        let totals = registry.totals();
        let mut cold_ratios = SampleMetric::default();
        let mut loss_rates = SampleMetric::default();
        for (_, counters) in registry.counter_iter() {
            if let Some(ratio) = counters.cold_start_ratio() {
                cold_ratios.add(ratio);
            }
            loss_rates.add(counters.rejections as f64 / elapsed);
        }
        let pooled_cold_start_ratio = if totals.requests == 0 {
            0.0
        } else {
            totals.cold_starts as f64 / totals.requests as f64
        };
        Self {
            elapsed,
            totals,
            pooled_cold_start_ratio,
            pooled_loss_rate: totals.rejections as f64 / elapsed,
            cold_start_ratio: cold_ratios.confidence_interval(Z_95),
            loss_rate: loss_rates.confidence_interval(Z_95),
        }
    }
}
