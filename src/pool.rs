//! `ObjectPools`: fixed-capacity, allocation-free pools for packet
//! buffers and event wrappers.
//!
//! Both pools are backed by a `heapless::spsc::Queue` of owned objects
//! rather than a free-list of indices into an arena: "allocate" is a
//! single-consumer `dequeue` (by value, O(1), no copy beyond the move),
//! "release" is a single-producer `enqueue`. This reuses the same
//! wait-free SPSC primitive the crate already needs for the event queue,
//! rather than hand-rolling a second lock-free structure, and gives the
//! ISR producer/consumer split the compiler already checks for free.
//!
//! By convention in this crate, the bit-clock ISR always holds the
//! *consumer* half (it allocates) and the deferred task always holds the
//! *producer* half (it releases), for both pools.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::config::{EVENT_POOL_CAPACITY, PACKET_POOL_CAPACITY};
use crate::event::Event;
use crate::packet::PacketBuffer;

/// Pool of reusable [`PacketBuffer`]s.
pub struct PacketPool(Queue<PacketBuffer, PACKET_POOL_CAPACITY>);

pub type PacketProducer<'q> = Producer<'q, PacketBuffer, PACKET_POOL_CAPACITY>;
pub type PacketConsumer<'q> = Consumer<'q, PacketBuffer, PACKET_POOL_CAPACITY>;

impl PacketPool {
    pub const fn new() -> Self {
        Self(Queue::new())
    }

    pub fn split(&mut self) -> (PacketProducer<'_>, PacketConsumer<'_>) {
        self.0.split()
    }
}

impl Default for PacketPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Pool of reusable [`Event`] wrappers.
pub struct EventPool(Queue<Event, EVENT_POOL_CAPACITY>);

pub type EventProducer<'q> = Producer<'q, Event, EVENT_POOL_CAPACITY>;
pub type EventConsumer<'q> = Consumer<'q, Event, EVENT_POOL_CAPACITY>;

impl EventPool {
    pub const fn new() -> Self {
        Self(Queue::new())
    }

    pub fn split(&mut self) -> (EventProducer<'_>, EventConsumer<'_>) {
        self.0.split()
    }
}

impl Default for EventPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Fills a freshly split packet pool producer with `PACKET_POOL_CAPACITY
/// - 1` fresh buffers (the usable capacity of a `heapless` SPSC queue is
/// one less than its backing capacity). Call once at startup, before the
/// bit-clock interrupt is enabled.
pub fn fill_packet_pool(producer: &mut PacketProducer<'_>) {
    while producer.enqueue(PacketBuffer::new()).is_ok() {}
}

/// Fills a freshly split event pool producer with empty event shells.
/// Call once at startup, before the bit-clock interrupt is enabled.
pub fn fill_event_pool(producer: &mut EventProducer<'_>) {
    while producer.enqueue(Event::default()).is_ok() {}
}
