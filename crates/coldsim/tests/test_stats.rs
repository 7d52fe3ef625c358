mod common;
use common::assert_float_eq;

use coldsim::function::{Function, FunctionRegistry};
use coldsim::stats::{Estimates, SampleMetric, Z_95};

#[test]
fn sample_metric_moments() {
    let mut metric = SampleMetric::default();
    for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
        metric.add(x);
    }
    assert_eq!(metric.len(), 8);
    assert_float_eq(metric.sum(), 40.0, 1e-9);
    assert_float_eq(metric.mean(), 5.0, 1e-9);
    // Bessel-corrected variance: sum of squared deviations 32 over N-1 = 7.
    assert_float_eq(metric.variance(), 32.0 / 7.0, 1e-9);
}

#[test]
fn confidence_interval_brackets_the_mean() {
    let mut metric = SampleMetric::default();
    for x in [0.1, 0.2, 0.3, 0.4, 0.5] {
        metric.add(x);
    }
    let ci = metric.confidence_interval(Z_95).unwrap();
    assert!(ci.lower <= ci.mean);
    assert!(ci.mean <= ci.upper);
    assert_float_eq(ci.mean, 0.3, 1e-9);
    assert_eq!(ci.samples, 5);
    let expected_half = Z_95 * metric.std_dev() / (5.0_f64).sqrt();
    assert_float_eq(ci.upper - ci.mean, expected_half, 1e-9);
    assert_float_eq(ci.mean - ci.lower, expected_half, 1e-9);
}

#[test]
fn confidence_interval_needs_two_samples() {
    let mut metric = SampleMetric::default();
    assert!(metric.confidence_interval(Z_95).is_none());
    metric.add(1.0);
    assert!(metric.confidence_interval(Z_95).is_none());
    metric.add(2.0);
    assert!(metric.confidence_interval(Z_95).is_some());
}

#[test]
fn pooled_and_cross_sectional_estimators_differ() {
    let mut registry = FunctionRegistry::default();
    let heavy = registry.add_function(Function::new(1.0, 1.0));
    let light = registry.add_function(Function::new(1.0, 1.0));
    {
        let c = registry.counters_mut(heavy);
        c.requests = 100;
        c.cold_starts = 0;
    }
    {
        let c = registry.counters_mut(light);
        c.requests = 1;
        c.cold_starts = 1;
        c.rejections = 10;
    }
    let estimates = Estimates::collect(&registry, 100.0);
    // Pooled mixes sample sizes: 1 cold start out of 101 requests.
    assert_float_eq(estimates.pooled_cold_start_ratio, 1.0 / 101.0, 1e-9);
    // Cross-sectional weighs each function equally: (0 + 1) / 2.
    let ci = estimates.cold_start_ratio.unwrap();
    assert_float_eq(ci.mean, 0.5, 1e-9);
    assert!(ci.lower <= ci.mean && ci.mean <= ci.upper);
    assert_float_eq(estimates.pooled_loss_rate, 0.1, 1e-9);
    let loss = estimates.loss_rate.unwrap();
    assert_float_eq(loss.mean, 0.05, 1e-9);
}

#[test]
fn functions_without_requests_are_excluded_from_the_cold_ratio() {
    let mut registry = FunctionRegistry::default();
    let seen = registry.add_function(Function::new(1.0, 1.0));
    for _ in 0..3 {
        registry.add_function(Function::new(1.0, 1.0));
    }
    {
        let c = registry.counters_mut(seen);
        c.requests = 4;
        c.cold_starts = 1;
    }
    let estimates = Estimates::collect(&registry, 10.0);
    // A single observation remains, too few for an interval.
    assert!(estimates.cold_start_ratio.is_none());
    assert_float_eq(estimates.pooled_cold_start_ratio, 0.25, 1e-9);
    // The loss-rate sample keeps all four functions.
    assert_eq!(estimates.loss_rate.unwrap().samples, 4);
}
