//! Workload traces.
//!
//! Input traces are CSV files with one record per function:
//! `FunctionID,AvgServiceTimeMilliseconds,Invocations30Days`
//! (the Azure-style format of the original dataset). Service and arrival rates are
//! derived from the record: the service rate is the inverse of the mean service time
//! and the arrival rate spreads the 30-day invocation count uniformly over the month.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::function::{Function, FunctionRegistry};

const SECONDS_PER_30_DAYS: f64 = 30.0 * 86400.0;

/// One input trace record.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TraceRecord {
    #[serde(rename = "FunctionID")]
    pub function_id: u64,
    #[serde(rename = "AvgServiceTimeMilliseconds")]
    pub avg_service_time_ms: u64,
    #[serde(rename = "Invocations30Days")]
    pub invocations_30_days: u64,
}

impl TraceRecord {
    /// Converts the record into per-second rates.
    pub fn to_function(&self) -> Function {
        Function::new(
            1000.0 / (self.avg_service_time_ms as f64),
            self.invocations_30_days as f64 / SECONDS_PER_30_DAYS,
        )
    }
}

/// Reads a workload trace from a CSV file.
pub fn read_trace(path: &Path) -> Result<Vec<TraceRecord>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// One output record of the per-function results file.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResultRecord {
    #[serde(rename = "FunctionID")]
    pub function_id: usize,
    #[serde(rename = "Requests")]
    pub requests: u64,
    #[serde(rename = "ColdStarts")]
    pub cold_starts: u64,
    #[serde(rename = "Promotions")]
    pub promotions: u64,
    #[serde(rename = "Completions")]
    pub completions: u64,
    #[serde(rename = "Rejections")]
    pub rejections: u64,
}

/// Writes the per-function counter snapshots to a CSV file.
pub fn write_function_results(path: &Path, registry: &FunctionRegistry) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for (id, c) in registry.counter_iter() {
        writer.serialize(ResultRecord {
            function_id: id,
            requests: c.requests,
            cold_starts: c.cold_starts,
            promotions: c.promotions,
            completions: c.completions,
            rejections: c.rejections,
        })?;
    }
    writer.flush()?;
    Ok(())
}
