//! Monotonic failure counters, observable from the consumer task and
//! cleared only by an explicit reset.

use core::sync::atomic::{AtomicU32, Ordering};

/// The three resource-exhaustion counters named in the external
/// interface contract.
///
/// `event_queue_pop_failures` is named for historical fidelity with the
/// source firmware: it actually counts *event pool* exhaustion (the
/// event pool, not the event queue, being empty when a packet
/// completes), not event-queue pop failures as the name implies. The
/// queue is SPSC and the ISR is its only consumer, so an event-queue pop
/// failure is not an observable condition from this side at all. See
/// `DESIGN.md` for the naming note.
#[derive(Default)]
pub struct Stats {
    event_queue_push_failures: AtomicU32,
    event_queue_pop_failures: AtomicU32,
    rx_packet_pool_pop_failures: AtomicU32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            event_queue_push_failures: AtomicU32::new(0),
            event_queue_pop_failures: AtomicU32::new(0),
            rx_packet_pool_pop_failures: AtomicU32::new(0),
        }
    }

    pub(crate) fn inc_event_queue_push_failures(&self) {
        self.event_queue_push_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_event_queue_pop_failures(&self) {
        self.event_queue_pop_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_rx_packet_pool_pop_failures(&self) {
        self.rx_packet_pool_pop_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_queue_push_failures(&self) -> u32 {
        self.event_queue_push_failures.load(Ordering::Relaxed)
    }

    pub fn event_queue_pop_failures(&self) -> u32 {
        self.event_queue_pop_failures.load(Ordering::Relaxed)
    }

    pub fn rx_packet_pool_pop_failures(&self) -> u32 {
        self.rx_packet_pool_pop_failures.load(Ordering::Relaxed)
    }

    /// Clears all counters. The only mutation permitted from outside the
    /// ISR path.
    pub fn reset(&self) {
        self.event_queue_push_failures.store(0, Ordering::Relaxed);
        self.event_queue_pop_failures.store(0, Ordering::Relaxed);
        self.rx_packet_pool_pop_failures.store(0, Ordering::Relaxed);
    }
}
