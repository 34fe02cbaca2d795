//! `SlotTimer`: the periodic tick at the 37.5Hz SOTDMA slot boundary.
//!
//! The scheduling policy that decides *what* happens in a given slot
//! (transmit candidacy, GNSS-derived frame alignment) belongs to the
//! out-of-scope SOTDMA transmit scheduler. This is only the free-running
//! counter that tells the receiver *which* slot just started, driven
//! from the TIM2-equivalent hardware timer's update interrupt, at the
//! same priority as the bit clock.

use crate::config::SLOTS_PER_FRAME;

/// Free-running SOTDMA slot counter, incremented once per timer
/// interrupt. Wraps every `SLOTS_PER_FRAME` slots (one minute).
pub struct SlotTimer {
    next: u32,
    last: u32,
}

impl SlotTimer {
    pub const fn new() -> Self {
        Self { next: 0, last: 0 }
    }

    /// Advances to the next slot and returns the slot index that just
    /// started. Call once per slot-timer interrupt, then forward the
    /// result to `Receiver::time_slot_started`.
    pub fn tick(&mut self) -> u32 {
        let current = self.next;
        self.last = current;
        self.next = (self.next + 1) % SLOTS_PER_FRAME;
        current
    }

    /// The slot index most recently returned by `tick`.
    pub fn current(&self) -> u32 {
        self.last
    }

    /// Realigns the counter to an externally-supplied slot index, e.g.
    /// on GNSS/1PPS re-synchronization. That synchronization logic
    /// itself is out of scope here; this is just the setter it needs.
    pub fn realign(&mut self, slot: u32) {
        self.next = slot % SLOTS_PER_FRAME;
    }
}

impl Default for SlotTimer {
    fn default() -> Self {
        Self::new()
    }
}
