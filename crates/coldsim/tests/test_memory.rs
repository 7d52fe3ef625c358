use coldsim::memory::{Memory, MemoryFault, MemoryState};

#[test]
fn admission_and_queries() {
    let mut mem = Memory::new(3);
    mem.enqueue_idle(0).unwrap();
    mem.enqueue_active(1).unwrap();
    mem.enqueue_loading(2).unwrap();
    assert!(mem.is_idle(0));
    assert!(mem.is_active(1));
    assert!(mem.is_loading(2));
    assert!(mem.is_unreserved(3));
    assert_eq!(mem.state(0), MemoryState::Idle);
    assert_eq!(mem.state(3), MemoryState::Unreserved);
    assert_eq!(mem.size(), 3);
    assert_eq!(mem.idle_count(), 1);
    assert_eq!(mem.active_count(), 1);
    assert_eq!(mem.loading_count(), 1);
}

#[test]
fn admission_faults() {
    let mut mem = Memory::new(1);
    mem.enqueue_idle(0).unwrap();
    assert_eq!(mem.enqueue_idle(0), Err(MemoryFault::Overflow));
    let mut mem = Memory::new(2);
    mem.enqueue_idle(0).unwrap();
    assert_eq!(mem.enqueue_loading(0), Err(MemoryFault::Clash));
    assert_eq!(mem.size(), 1);
}

#[test]
fn capacity_invariant_holds_across_evict_admit_pair() {
    let mut mem = Memory::new(2);
    mem.fill(0..10).unwrap();
    assert_eq!(mem.size(), 2);
    assert!(mem.is_full());
    let victim = mem.evict().unwrap();
    assert_eq!(victim, 0);
    mem.enqueue_loading(7).unwrap();
    assert_eq!(mem.size(), 2);
    assert!(mem.size() <= mem.capacity());
}

#[test]
fn eviction_is_fifo_by_idle_order() {
    let mut mem = Memory::new(10);
    for id in 0..10 {
        mem.enqueue_idle(id).unwrap();
    }
    assert_eq!(mem.evict().unwrap(), 0);
    assert_eq!(mem.evict().unwrap(), 1);
    assert_eq!(mem.idle_count(), 8);
}

#[test]
fn round_trip_sole_idle_entry() {
    let mut mem = Memory::new(4);
    mem.enqueue_idle(5).unwrap();
    assert_eq!(mem.evict().unwrap(), 5);
    assert_eq!(mem.idle_count(), 0);
    assert_eq!(mem.size(), 0);
    assert!(mem.is_unreserved(5));
}

#[test]
fn evict_underflows_without_idle_entries() {
    let mut mem = Memory::new(2);
    assert!(!mem.can_evict());
    assert_eq!(mem.evict(), Err(MemoryFault::Underflow));
    mem.enqueue_active(0).unwrap();
    mem.enqueue_loading(1).unwrap();
    assert!(!mem.can_evict());
    assert_eq!(mem.evict(), Err(MemoryFault::Underflow));
}

#[test]
fn promote_transitions() {
    let mut mem = Memory::new(2);
    mem.enqueue_loading(0).unwrap();
    mem.enqueue_idle(1).unwrap();
    mem.promote(0).unwrap();
    mem.promote(1).unwrap();
    assert!(mem.is_active(0));
    assert!(mem.is_active(1));
    // The promoted function must have left the idle ordering.
    assert!(!mem.can_evict());
    assert_eq!(mem.promote(2), Err(MemoryFault::Missing));
}

#[test]
fn demote_transitions() {
    let mut mem = Memory::new(2);
    mem.enqueue_active(0).unwrap();
    mem.demote(0).unwrap();
    assert!(mem.is_idle(0));
    mem.demote(0).unwrap();
    assert!(mem.is_unreserved(0));
    assert_eq!(mem.size(), 0);
    assert_eq!(mem.demote(0), Err(MemoryFault::Missing));
}

#[test]
fn loading_function_is_not_reclaimable() {
    let mut mem = Memory::new(1);
    mem.enqueue_loading(0).unwrap();
    assert_eq!(mem.demote(0), Err(MemoryFault::Busy));
    assert!(mem.is_loading(0));
}

#[test]
fn demote_restamps_idle_order() {
    let mut mem = Memory::new(3);
    mem.enqueue_idle(0).unwrap();
    mem.enqueue_idle(1).unwrap();
    mem.enqueue_active(2).unwrap();
    // 2 turns idle after 0 and 1, then 0 cycles through active and back to idle,
    // making it the youngest idle entry.
    mem.demote(2).unwrap();
    mem.promote(0).unwrap();
    mem.demote(0).unwrap();
    assert_eq!(mem.evict().unwrap(), 1);
    assert_eq!(mem.evict().unwrap(), 2);
    assert_eq!(mem.evict().unwrap(), 0);
}

#[test]
fn peek_does_not_remove() {
    let mut mem = Memory::new(2);
    mem.enqueue_idle(3).unwrap();
    mem.enqueue_idle(4).unwrap();
    assert_eq!(mem.peek_oldest_idle(), Some(3));
    assert_eq!(mem.idle_count(), 2);
    assert_eq!(mem.evict().unwrap(), 3);
}

#[test]
fn fill_stops_at_capacity() {
    let mut mem = Memory::new(3);
    mem.fill(0..100).unwrap();
    assert_eq!(mem.size(), 3);
    assert!(mem.is_idle(0));
    assert!(mem.is_idle(1));
    assert!(mem.is_idle(2));
    assert!(mem.is_unreserved(3));
}

#[test]
fn each_function_is_in_exactly_one_state() {
    let mut mem = Memory::new(3);
    mem.enqueue_idle(0).unwrap();
    mem.enqueue_active(1).unwrap();
    mem.enqueue_loading(2).unwrap();
    for id in 0..4 {
        let states = [
            mem.is_unreserved(id),
            mem.is_loading(id),
            mem.is_idle(id),
            mem.is_active(id),
        ];
        assert_eq!(states.iter().filter(|&&x| x).count(), 1);
    }
}
