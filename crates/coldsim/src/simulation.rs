//! Simulation engine: the time-ordered event queue, the logical clock and the
//! request-handling protocol tying memory transitions to counter updates.

use std::collections::BinaryHeap;

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::Config;
use crate::event::{Event, EventId, EventKind, FunctionId};
use crate::function::{Function, FunctionRegistry};
use crate::memory::{Memory, MemoryFault, MemoryState};
use crate::sampler::{ExpSampler, Sampler};
use crate::stats::{Estimates, StateSnapshot};
use crate::util::Counter;

/// Discrete-event simulation of a single FaaS host.
///
/// Each function runs its own independent renewal arrival process inside one shared
/// event queue. Execution is strictly sequential in non-decreasing event time; ties
/// are broken FIFO by event id, so runs with the same seed are reproducible.
pub struct FaaSSimulation {
    config: Config,
    memory: Memory,
    registry: FunctionRegistry,
    sampler: Box<dyn Sampler>,
    events: BinaryHeap<Event>,
    canceled: FxHashSet<EventId>,
    // Links from a pending event to the one pending event chained behind it,
    // for depth-1 cascading cancellation.
    chained: FxHashMap<EventId, EventId>,
    event_seq: Counter,
    processed: u64,
    clock: f64,
    seeded: bool,
    warmup_pending: bool,
    snapshots: Vec<StateSnapshot>,
    next_snapshot: Option<f64>,
}

impl FaaSSimulation {
    /// Creates a simulation with the production sampler seeded from the config.
    pub fn new(config: Config) -> Self {
        let sampler = Box::new(ExpSampler::new(config.seed));
        Self::with_sampler(config, sampler)
    }

    /// Creates a simulation with an externally supplied variate source.
    pub fn with_sampler(config: Config, sampler: Box<dyn Sampler>) -> Self {
        Self {
            memory: Memory::new(config.capacity),
            registry: FunctionRegistry::default(),
            sampler,
            events: BinaryHeap::new(),
            canceled: FxHashSet::default(),
            chained: FxHashMap::default(),
            event_seq: Counter::default(),
            processed: 0,
            clock: 0.0,
            seeded: false,
            warmup_pending: config.warmup.is_some(),
            snapshots: Vec::new(),
            next_snapshot: config.snapshot_interval,
            config,
        }
    }

    pub fn add_function(&mut self, f: Function) -> FunctionId {
        self.registry.add_function(f)
    }

    /// Current simulated time. Advances only when an event is dequeued.
    pub fn time(&self) -> f64 {
        self.clock
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Number of processed events.
    pub fn processed_count(&self) -> u64 {
        self.processed
    }

    /// Total number of scheduled events, including canceled ones.
    pub fn event_count(&self) -> u64 {
        self.event_seq.curr()
    }

    /// Recorded periodic snapshots.
    pub fn snapshots(&self) -> &[StateSnapshot] {
        &self.snapshots
    }

    /// Aggregate counter totals at the current simulated time.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(self.clock, &self.registry.totals())
    }

    /// Builds estimates from the counters accumulated so far.
    pub fn estimates(&self) -> Estimates {
        Estimates::collect(&self.registry, self.elapsed())
    }

    /// Schedules an event after `delay` simulated seconds and returns its id.
    pub fn schedule(&mut self, kind: EventKind, func_id: FunctionId, delay: f64) -> EventId {
        debug_assert!(delay >= 0.0, "negative event delay");
        let id = self.event_seq.increment();
        self.events.push(Event {
            id,
            time: self.clock + delay,
            func_id,
            kind,
        });
        id
    }

    /// Links a pending event to the pending event chained behind it, so that
    /// cancelling the former also cancels the latter.
    pub fn chain(&mut self, parent: EventId, child: EventId) {
        self.chained.insert(parent, child);
    }

    /// Cancels a pending event and the one event chained directly behind it.
    /// Already processed events are unaffected.
    pub fn cancel(&mut self, id: EventId) {
        self.canceled.insert(id);
        if let Some(child) = self.chained.remove(&id) {
            self.canceled.insert(child);
        }
    }

    /// Seeds one initial Request per function and optionally pre-fills memory with
    /// idle functions (rule A6). Called automatically by [`run`](Self::run).
    pub fn init(&mut self) -> Result<(), MemoryFault> {
        if self.seeded {
            return Ok(());
        }
        self.seeded = true;
        if self.config.prefill {
            let ids: Vec<FunctionId> = self.registry.function_iter().map(|(id, _)| id).collect();
            self.memory.fill(ids)?;
        }
        let arrivals: Vec<(FunctionId, f64)> = self
            .registry
            .function_iter()
            .map(|(id, f)| (id, f.arrival_rate))
            .collect();
        for (id, rate) in arrivals {
            let delay = self.sampler.exponential(rate);
            self.schedule(EventKind::Request, id, delay);
        }
        debug!(
            "[{:.3}] seeded {} arrival processes, {}/{} functions resident",
            self.clock,
            self.registry.len(),
            self.memory.size(),
            self.memory.capacity()
        );
        Ok(())
    }

    /// Runs the simulation until the configured time or event-count bound, or until
    /// the queue drains. Returns the resulting estimates; a [`MemoryFault`] signals a
    /// modeling bug and aborts the run.
    pub fn run(&mut self) -> Result<Estimates, MemoryFault> {
        self.init()?;
        while let Some(event) = self.next_event() {
            self.take_snapshots(event.time);
            self.apply_warmup(event.time);
            // The bound may fall strictly between two event times, so the stop
            // condition is re-checked after the clock has advanced.
            if self.stopped() {
                break;
            }
            self.dispatch(event)?;
            self.processed += 1;
        }
        let estimates = self.estimates();
        debug!(
            "[{:.3}] run finished: {} events, {} requests, pooled cold ratio {:.4}",
            self.clock, self.processed, estimates.totals.requests, estimates.pooled_cold_start_ratio
        );
        Ok(estimates)
    }

    /// Processes a single event, ignoring the stop bounds. Returns `false` once the
    /// queue is empty.
    pub fn step(&mut self) -> Result<bool, MemoryFault> {
        self.init()?;
        if let Some(event) = self.next_event() {
            self.take_snapshots(event.time);
            self.apply_warmup(event.time);
            self.dispatch(event)?;
            self.processed += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn stopped(&self) -> bool {
        if let Some(d) = self.config.duration {
            if self.clock > d {
                return true;
            }
        }
        if let Some(m) = self.config.max_events {
            if self.processed >= m {
                return true;
            }
        }
        false
    }

    // Pops the earliest non-canceled event and advances the clock to its time.
    fn next_event(&mut self) -> Option<Event> {
        while let Some(event) = self.events.pop() {
            self.chained.remove(&event.id);
            if !self.canceled.remove(&event.id) {
                self.clock = event.time;
                return Some(event);
            }
        }
        None
    }

    // Records snapshots for every interval boundary passed before `time`.
    fn take_snapshots(&mut self, time: f64) {
        let interval = match self.config.snapshot_interval {
            Some(i) => i,
            None => return,
        };
        while let Some(at) = self.next_snapshot {
            if at > time {
                break;
            }
            // Boundaries past the duration bound are unreachable counter-wise.
            if let Some(d) = self.config.duration {
                if at > d {
                    self.next_snapshot = None;
                    break;
                }
            }
            self.snapshots.push(StateSnapshot::new(at, &self.registry.totals()));
            self.next_snapshot = Some(at + interval);
        }
    }

    // Discards the all-idle startup transient: once the clock first reaches the
    // warm-up bound, counters and the snapshot log are reset, exactly once.
    fn apply_warmup(&mut self, time: f64) {
        if !self.warmup_pending {
            return;
        }
        let warmup = self.config.warmup.unwrap();
        if time >= warmup {
            self.warmup_pending = false;
            self.registry.reset_counters();
            self.snapshots.clear();
            debug!("[{:.3}] warm-up period of {:.3} elapsed, counters reset", time, warmup);
        }
    }

    // Simulated time span the counters cover, used as the denominator of rate
    // estimators. Clamped to the duration bound because the clock may overshoot it
    // by the gap to the first out-of-bound event.
    fn elapsed(&self) -> f64 {
        let end = match self.config.duration {
            Some(d) if self.clock > d => d,
            _ => self.clock,
        };
        let start = match self.config.warmup {
            Some(w) if !self.warmup_pending => w,
            _ => 0.0,
        };
        end - start
    }

    fn dispatch(&mut self, event: Event) -> Result<(), MemoryFault> {
        trace!(
            "[{:.3}] {:?} f{} ({:?})",
            event.time,
            event.kind,
            event.func_id,
            self.memory.state(event.func_id)
        );
        match event.kind {
            EventKind::Request => self.on_request(event.func_id),
            EventKind::Promotion => self.on_promotion(event.func_id),
            EventKind::Completion => self.on_completion(event.func_id),
        }
    }

    // A request for function f arrives. Depending on f's memory state it is served
    // from the idle pool, lost, or admitted through a cold start. The next request of
    // f's renewal process is scheduled unconditionally.
    fn on_request(&mut self, func_id: FunctionId) -> Result<(), MemoryFault> {
        let function = *self
            .registry
            .get_function(func_id)
            .unwrap_or_else(|| panic!("request for unknown function {}", func_id));
        self.registry.counters_mut(func_id).requests += 1;

        match self.memory.state(func_id) {
            MemoryState::Idle => {
                self.memory.promote(func_id)?;
                let service = self.sampler.exponential(function.service_rate);
                self.schedule(EventKind::Completion, func_id, service);
            }
            // The function already serves another request (A2) or is mid cold start
            // (A3). Either way the request is lost, not queued. This is an expected
            // business outcome, never a fault.
            MemoryState::Active | MemoryState::Loading => {
                self.registry.counters_mut(func_id).rejections += 1;
            }
            MemoryState::Unreserved => {
                if self.admit(func_id)? {
                    self.registry.counters_mut(func_id).cold_starts += 1;
                    let overhead = self.sampler.exponential(self.config.cold_start_rate);
                    self.schedule(EventKind::Promotion, func_id, overhead);
                } else {
                    // Memory is full and nothing is evictable.
                    self.registry.counters_mut(func_id).rejections += 1;
                }
            }
        }

        let inter_arrival = self.sampler.exponential(function.arrival_rate);
        self.schedule(EventKind::Request, func_id, inter_arrival);
        Ok(())
    }

    // Admits the function into the Loading tier, evicting the longest-idle resident
    // only when memory is full (A1). Returns false if admission is impossible.
    fn admit(&mut self, func_id: FunctionId) -> Result<bool, MemoryFault> {
        if self.memory.is_full() {
            if !self.memory.can_evict() {
                return Ok(false);
            }
            let victim = self.memory.evict()?;
            trace!("[{:.3}] evicted f{} for f{}", self.clock, victim, func_id);
        }
        self.memory.enqueue_loading(func_id)?;
        Ok(true)
    }

    // The cold start is over: the function becomes active and starts serving the
    // request that triggered it.
    fn on_promotion(&mut self, func_id: FunctionId) -> Result<(), MemoryFault> {
        self.memory.promote(func_id)?;
        self.registry.counters_mut(func_id).promotions += 1;
        let service_rate = self.registry.get_function(func_id).unwrap().service_rate;
        let service = self.sampler.exponential(service_rate);
        self.schedule(EventKind::Completion, func_id, service);
        Ok(())
    }

    // The function finished serving and turns idle with a fresh idle-order stamp.
    // The arrival stream is decoupled from the service stream, so nothing is spawned.
    fn on_completion(&mut self, func_id: FunctionId) -> Result<(), MemoryFault> {
        self.memory.demote(func_id)?;
        self.registry.counters_mut(func_id).completions += 1;
        Ok(())
    }
}
