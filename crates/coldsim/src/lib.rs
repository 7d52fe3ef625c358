//! A library for estimating cold-start probability and request loss on a single FaaS host.
//!
//! The simulator keeps a bounded number of functions resident in three memory tiers
//! (Loading, Active, Idle) and evicts the longest-idle resident when admitting a new one.
//! Requests per function arrive as independent renewal processes driven by a shared
//! discrete-event queue. After a run, [`stats::Estimates`] exposes both pooled and
//! cross-sectional estimators of the cold-start ratio and the loss rate.

pub mod config;
pub mod event;
pub mod function;
pub mod memory;
pub mod sampler;
pub mod simulation;
pub mod stats;
pub mod trace;
pub mod util;
