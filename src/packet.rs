//! `PacketBuffer`: a fixed-capacity byte buffer tagged with the channel
//! and slot it was received on.

use heapless::Vec;

use crate::channel::VhfChannel;
use crate::config::MAX_AIS_RX_PACKET_SIZE;

/// Raised when a byte is appended past `MAX_AIS_RX_PACKET_SIZE`. The
/// decoder checks packet length before ever reaching this, so in
/// practice this is unreachable from within the crate; it exists so the
/// capacity invariant is visible in the type signature rather than
/// silently discarding overflow bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityExceeded;

/// One in-flight (or completed) AIS packet: raw post-destuffing HDLC
/// body including the FCS, plus the channel and slot it was received on.
///
/// Drawn from a [`crate::pool::PacketPool`], mutated exclusively by the
/// bit-clock ISR while attached to a [`crate::receiver::Receiver`],
/// handed to an [`crate::event::Event`] on completion, and returned to
/// the pool once the consumer is done with it. `reset` is O(1): it never
/// reallocates, only clears the existing backing storage.
#[derive(Clone)]
pub struct PacketBuffer {
    bytes: Vec<u8, MAX_AIS_RX_PACKET_SIZE>,
    channel: Option<VhfChannel>,
    slot: u32,
}

impl PacketBuffer {
    /// An empty buffer with no channel or slot stamped yet.
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            channel: None,
            slot: 0,
        }
    }

    /// Clears the payload and channel/slot tags in place. O(1).
    pub fn reset(&mut self) {
        self.bytes.clear();
        self.channel = None;
        self.slot = 0;
    }

    /// Appends one payload byte. Fails if the buffer is already at
    /// `MAX_AIS_RX_PACKET_SIZE`.
    pub fn push_byte(&mut self, byte: u8) -> Result<(), CapacityExceeded> {
        self.bytes.push(byte).map_err(|_| CapacityExceeded)
    }

    /// Number of payload bytes committed so far.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if no bytes have been committed yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw post-destuffing payload, FCS included.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The channel this packet's preamble was acquired on, if any.
    pub fn channel(&self) -> Option<VhfChannel> {
        self.channel
    }

    pub(crate) fn set_channel(&mut self, channel: VhfChannel) {
        self.channel = Some(channel);
    }

    /// The SOTDMA slot this packet's preamble was acquired in (or the
    /// slot current when last stamped by `time_slot_started`).
    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub(crate) fn set_slot(&mut self, slot: u32) {
        self.slot = slot;
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new()
    }
}
