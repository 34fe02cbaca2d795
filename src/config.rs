//! Fixed sizing and timing constants for the receive pipeline.
//!
//! These are compile-time constants rather than a runtime configuration
//! object: the pool and queue capacities back fixed-size `heapless`
//! storage, so they must be known at compile time.

/// Maximum size of a single AIS packet payload, post-destuffing, FCS
/// included. Matches the MAIANA firmware's `MAX_AIS_RX_PACKET_SIZE`.
pub const MAX_AIS_RX_PACKET_SIZE: usize = 128;

/// Backing capacity of the `heapless::spsc::Queue` used for the packet
/// buffer pool. Usable capacity is one less than this (a `heapless`
/// queue always keeps one slot free), i.e. 8 packet buffers in flight.
pub const PACKET_POOL_CAPACITY: usize = 9;

/// Backing capacity of the event wrapper pool. Usable capacity is 8.
pub const EVENT_POOL_CAPACITY: usize = 9;

/// Backing capacity of the ISR -> task event queue. Usable capacity is 8.
pub const EVENT_QUEUE_CAPACITY: usize = 9;

/// Number of SOTDMA slots per minute-long frame (2250 slots of ~26.67ms).
pub const SLOTS_PER_FRAME: u32 = 2250;

/// Bit-clock ticks per second (9600 baud FSK channel).
pub const BIT_CLOCK_HZ: u32 = 9600;

/// The slot-bit at which clear-channel assessment is meaningful, i.e.
/// the bit index (within a slot) at which RSSI should be sampled, one
/// tick before this value (`CCA_SLOT_BIT - 1`).
pub const CCA_SLOT_BIT: i16 = 12;

/// RSSI sampling is interleaved once every this-many slots, offset by
/// chip id, so that a two-IC board never samples both receivers in the
/// same slot.
pub const RSSI_SLOT_MODULUS: u32 = 17;
