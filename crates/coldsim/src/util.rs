//! Various utility structs.

/// A simple incrementing counter.
#[derive(Clone, Copy, Default)]
pub struct Counter {
    value: u64,
}

impl Counter {
    /// Returns current counter value.
    pub fn curr(&self) -> u64 {
        self.value
    }

    /// Post-increments the counter.
    pub fn increment(&mut self) -> u64 {
        let curr = self.value;
        self.value += 1;
        curr
    }
}
