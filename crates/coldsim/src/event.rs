//! Event model of the simulation.

use std::cmp::Ordering;

use serde::Serialize;

/// Identifier of a scheduled event, unique within a simulation run.
pub type EventId = u64;

/// Identifier of a function, assigned sequentially by
/// [`FunctionRegistry`](crate::function::FunctionRegistry).
pub type FunctionId = usize;

/// The closed set of event kinds driving the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// A request for the function arrives.
    Request,
    /// The function finishes its cold start and moves Loading -> Active.
    Promotion,
    /// The function finishes serving and moves Active -> Idle.
    Completion,
}

/// A scheduled event. `id` grows monotonically with insertion order, so ordering by
/// `(time, id)` breaks time ties FIFO.
#[derive(Clone, Debug, Serialize)]
pub struct Event {
    pub id: EventId,
    pub time: f64,
    pub func_id: FunctionId,
    pub kind: EventKind,
}

impl Eq for Event {}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Ord for Event {
    // Inverted so that BinaryHeap pops the earliest event first.
    // total_cmp keeps the ordering strict for near-equal times.
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
