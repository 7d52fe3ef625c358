//! Memory model: a capacity-bounded partition of resident functions into three tiers
//! (Loading, Idle, Active) with FIFO eviction of the longest-idle resident.
//!
//! All functions are assumed to occupy the same amount of memory, so the capacity is
//! expressed as a number of resident functions rather than bytes. Each mutating
//! operation takes `&mut self` and either applies fully or returns a fault without
//! touching the tiers, so a partially-applied transition is never observable.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::Serialize;
use thiserror::Error;

use crate::event::FunctionId;
use crate::util::Counter;

/// Residency state of a single function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MemoryState {
    /// Not resident in memory.
    Unreserved,
    /// Mid cold start, not yet able to serve.
    Loading,
    /// Resident and not serving.
    Idle,
    /// Currently serving one request.
    Active,
}

/// A violated memory invariant. Every variant signals a logic bug in the caller and
/// must abort the run; expected outcomes of request handling (collisions, lost
/// requests) are counted by the caller and never surface here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MemoryFault {
    /// The function is already resident in some tier.
    #[error("function is already resident in memory")]
    Clash,
    /// Admission would exceed the memory capacity.
    #[error("memory capacity exceeded")]
    Overflow,
    /// The function is not resident in memory.
    #[error("function is not resident in memory")]
    Missing,
    /// The function is mid-allocation and cannot be reclaimed or demoted.
    #[error("function is loading and cannot be reclaimed")]
    Busy,
    /// Eviction was requested while no function is idle.
    #[error("no idle function to evict")]
    Underflow,
}

#[derive(Clone, Copy)]
struct Slot {
    state: MemoryState,
    // Monotone idle-order stamp, meaningful only while state == Idle.
    stamp: u64,
}

/// The three-tier memory of a single host.
///
/// Tier membership is kept in one map from function id to `(state, stamp)`; the idle
/// ordering is indexed separately by a `BTreeSet` keyed by `(stamp, id)`, giving
/// O(log n) oldest-idle lookup and removal. Stamps come from a counter owned by this
/// struct, so equal stamps are impossible; the id component of the key only settles
/// comparisons across data structures.
pub struct Memory {
    capacity: usize,
    slots: FxHashMap<FunctionId, Slot>,
    idle_order: BTreeSet<(u64, FunctionId)>,
    stamp: Counter,
}

impl Memory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: FxHashMap::default(),
            idle_order: BTreeSet::new(),
            stamp: Counter::default(),
        }
    }

    /// Number of resident functions across all three tiers.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Current state of the function, [`MemoryState::Unreserved`] if not resident.
    pub fn state(&self, id: FunctionId) -> MemoryState {
        self.slots.get(&id).map_or(MemoryState::Unreserved, |s| s.state)
    }

    pub fn is_active(&self, id: FunctionId) -> bool {
        self.state(id) == MemoryState::Active
    }

    pub fn is_idle(&self, id: FunctionId) -> bool {
        self.state(id) == MemoryState::Idle
    }

    pub fn is_loading(&self, id: FunctionId) -> bool {
        self.state(id) == MemoryState::Loading
    }

    pub fn is_unreserved(&self, id: FunctionId) -> bool {
        self.state(id) == MemoryState::Unreserved
    }

    /// Pre-populates the idle tier with the given functions until the memory is full
    /// (original rule A6: start with the first M functions idle so that memory is
    /// always fully occupied and unused space need not be modeled).
    pub fn fill<I>(&mut self, ids: I) -> Result<(), MemoryFault>
    where
        I: IntoIterator<Item = FunctionId>,
    {
        for id in ids {
            if self.is_full() {
                break;
            }
            self.enqueue_idle(id)?;
        }
        Ok(())
    }

    /// Admits the function into the Loading tier.
    pub fn enqueue_loading(&mut self, id: FunctionId) -> Result<(), MemoryFault> {
        self.admit(id, MemoryState::Loading)
    }

    /// Admits the function into the Active tier.
    pub fn enqueue_active(&mut self, id: FunctionId) -> Result<(), MemoryFault> {
        self.admit(id, MemoryState::Active)
    }

    /// Admits the function into the Idle tier, stamping it with a fresh idle order.
    pub fn enqueue_idle(&mut self, id: FunctionId) -> Result<(), MemoryFault> {
        self.admit(id, MemoryState::Idle)
    }

    fn admit(&mut self, id: FunctionId, state: MemoryState) -> Result<(), MemoryFault> {
        debug_assert!(state != MemoryState::Unreserved);
        if self.slots.len() >= self.capacity {
            return Err(MemoryFault::Overflow);
        }
        if self.slots.contains_key(&id) {
            return Err(MemoryFault::Clash);
        }
        let stamp = self.stamp.increment();
        if state == MemoryState::Idle {
            self.idle_order.insert((stamp, id));
        }
        self.slots.insert(id, Slot { state, stamp });
        Ok(())
    }

    /// Promotes the function into the Active tier: Loading -> Active or Idle -> Active.
    pub fn promote(&mut self, id: FunctionId) -> Result<(), MemoryFault> {
        let slot = self.slots.get_mut(&id).ok_or(MemoryFault::Missing)?;
        match slot.state {
            MemoryState::Loading => {
                slot.state = MemoryState::Active;
            }
            MemoryState::Idle => {
                slot.state = MemoryState::Active;
                self.idle_order.remove(&(slot.stamp, id));
            }
            // Already at the top of the hierarchy.
            MemoryState::Active => {}
            MemoryState::Unreserved => unreachable!("unreserved functions have no slot"),
        }
        Ok(())
    }

    /// Demotes the function one tier down: Active -> Idle (with a fresh idle-order
    /// stamp) or Idle -> Unreserved. A loading function is mid-allocation and not
    /// reclaimable (rule A4), so demoting it is a fault.
    pub fn demote(&mut self, id: FunctionId) -> Result<(), MemoryFault> {
        let slot = self.slots.get_mut(&id).ok_or(MemoryFault::Missing)?;
        match slot.state {
            MemoryState::Loading => Err(MemoryFault::Busy),
            MemoryState::Active => {
                slot.state = MemoryState::Idle;
                slot.stamp = self.stamp.increment();
                self.idle_order.insert((slot.stamp, id));
                Ok(())
            }
            MemoryState::Idle => {
                let stamp = slot.stamp;
                self.slots.remove(&id);
                self.idle_order.remove(&(stamp, id));
                Ok(())
            }
            MemoryState::Unreserved => unreachable!("unreserved functions have no slot"),
        }
    }

    /// Whether there is an idle function that could be evicted.
    pub fn can_evict(&self) -> bool {
        !self.idle_order.is_empty()
    }

    /// Looks at the longest continuously-idle function without removing it.
    pub fn peek_oldest_idle(&self) -> Option<FunctionId> {
        self.idle_order.iter().next().map(|&(_, id)| id)
    }

    /// Evicts the longest continuously-idle function and returns its id.
    pub fn evict(&mut self) -> Result<FunctionId, MemoryFault> {
        let &(stamp, id) = self.idle_order.iter().next().ok_or(MemoryFault::Underflow)?;
        self.idle_order.remove(&(stamp, id));
        self.slots.remove(&id);
        Ok(id)
    }

    /// Number of idle residents.
    pub fn idle_count(&self) -> usize {
        self.idle_order.len()
    }

    /// Number of active residents.
    pub fn active_count(&self) -> usize {
        self.count(MemoryState::Active)
    }

    /// Number of loading residents.
    pub fn loading_count(&self) -> usize {
        self.count(MemoryState::Loading)
    }

    fn count(&self, state: MemoryState) -> usize {
        self.slots.values().filter(|s| s.state == state).count()
    }
}
