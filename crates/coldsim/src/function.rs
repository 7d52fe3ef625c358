//! Function descriptors and per-function outcome counters.

use serde::Serialize;

use crate::event::FunctionId;

/// Static parameters of a function. Rates are per simulated second.
#[derive(Clone, Copy, Debug)]
pub struct Function {
    /// Service rate, the inverse of the mean service time.
    pub service_rate: f64,
    /// Arrival rate of the function's renewal request process.
    pub arrival_rate: f64,
}

impl Function {
    pub fn new(service_rate: f64, arrival_rate: f64) -> Self {
        Self {
            service_rate,
            arrival_rate,
        }
    }
}

/// Outcome counters of a single function, updated by the request-handling protocol.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct FunctionCounters {
    /// Requests that arrived for the function.
    pub requests: u64,
    /// Requests that triggered a cold start.
    pub cold_starts: u64,
    /// Completed cold starts (Loading -> Active transitions).
    pub promotions: u64,
    /// Requests served to completion.
    pub completions: u64,
    /// Requests lost because the function was busy, loading or not admittable.
    pub rejections: u64,
}

impl FunctionCounters {
    /// Cold-start ratio of this function alone, `None` if it saw no requests.
    pub fn cold_start_ratio(&self) -> Option<f64> {
        if self.requests == 0 {
            None
        } else {
            Some(self.cold_starts as f64 / self.requests as f64)
        }
    }
}

/// Holds all functions of the simulated host together with their counters.
/// Function ids are assigned sequentially starting from 0.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: Vec<Function>,
    counters: Vec<FunctionCounters>,
}

impl FunctionRegistry {
    pub fn add_function(&mut self, f: Function) -> FunctionId {
        let id = self.functions.len();
        self.functions.push(f);
        self.counters.push(FunctionCounters::default());
        id
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn get_function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id)
    }

    pub fn get_counters(&self, id: FunctionId) -> Option<&FunctionCounters> {
        self.counters.get(id)
    }

    pub fn counters_mut(&mut self, id: FunctionId) -> &mut FunctionCounters {
        &mut self.counters[id]
    }

    pub fn function_iter(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions.iter().enumerate()
    }

    pub fn counter_iter(&self) -> impl Iterator<Item = (FunctionId, &FunctionCounters)> {
        self.counters.iter().enumerate()
    }

    /// Sums the counters over all functions.
    pub fn totals(&self) -> FunctionCounters {
        let mut total = FunctionCounters::default();
        for c in &self.counters {
            total.requests += c.requests;
            total.cold_starts += c.cold_starts;
            total.promotions += c.promotions;
            total.completions += c.completions;
            total.rejections += c.rejections;
        }
        total
    }

    /// Zeroes all counters. Used once to discard the warm-up transient.
    pub fn reset_counters(&mut self) {
        for c in self.counters.iter_mut() {
            *c = FunctionCounters::default();
        }
    }
}
