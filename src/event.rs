//! `Event`: the tagged union handed from the bit-clock ISR to the
//! deferred consumer task, and the SPSC queue it travels over.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::config::EVENT_QUEUE_CAPACITY;
use crate::packet::PacketBuffer;
use crate::pool::{EventProducer, PacketProducer};

/// The only event kind this core ever produces. Kept as an explicit tag
/// (rather than collapsing `Event` to a bare `PacketBuffer`) because the
/// source data model describes `Event` as a tagged union; other event
/// kinds belong to collaborators outside this crate's scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    AisPacket,
}

/// Exclusive ownership of one completed [`PacketBuffer`], tagged with its
/// kind. Drawn from the event pool at packet completion, pushed onto the
/// [`EventQueue`], and released back to both pools by the consumer once
/// processed.
pub struct Event {
    pub kind: EventKind,
    pub rx_packet: PacketBuffer,
}

impl Event {
    /// Returns this event's packet buffer and the event wrapper itself
    /// to their respective pools, after resetting the buffer. This is
    /// the consumer-side half of the pool contract: the ISR only ever
    /// acquires from a pool, never releases.
    pub fn release(self, packet_pool: &mut PacketProducer<'_>, event_pool: &mut EventProducer<'_>) {
        let Event { kind, mut rx_packet } = self;
        rx_packet.reset();
        let _ = packet_pool.enqueue(rx_packet);
        let _ = event_pool.enqueue(Event {
            kind,
            rx_packet: PacketBuffer::new(),
        });
    }
}

impl Default for Event {
    fn default() -> Self {
        Self {
            kind: EventKind::AisPacket,
            rx_packet: PacketBuffer::new(),
        }
    }
}

/// Bounded single-producer-single-consumer queue carrying completed
/// events from the bit-clock ISR (producer) to the deferred consumer
/// task (consumer). Push is non-blocking; a full queue is reported via
/// `Stats::event_queue_push_failures` rather than propagated.
pub struct EventQueue(Queue<Event, EVENT_QUEUE_CAPACITY>);

pub type EventQueueProducer<'q> = Producer<'q, Event, EVENT_QUEUE_CAPACITY>;
pub type EventQueueConsumer<'q> = Consumer<'q, Event, EVENT_QUEUE_CAPACITY>;

impl EventQueue {
    pub const fn new() -> Self {
        Self(Queue::new())
    }

    /// Splits into the producer half (used by the ISR) and the consumer
    /// half (used by the deferred consumer task).
    pub fn split(&mut self) -> (EventQueueProducer<'_>, EventQueueConsumer<'_>) {
        self.0.split()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
