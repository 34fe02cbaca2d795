//! NRZI decoding and HDLC flag framing with bit-destuffing.
//!
//! This is the one piece of the receive pipeline with a hard real-time
//! budget on every single call: `process_bit` must complete in well
//! under the ~104us bit period, every time, with no branch that can
//! suspend or recurse into an allocator.

use crate::packet::PacketBuffer;

const PREAMBLE_FLAG_EVEN: u16 = 0b1010_1010_0111_1110;
const PREAMBLE_FLAG_ODD: u16 = 0b0101_0101_0111_1110;
const HDLC_FLAG: u16 = 0x7E;

/// Where the decoder sits between packets and within one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverState {
    /// Scanning the bit window for the preamble + HDLC start flag.
    PreambleSync,
    /// Between the start flag and the closing flag; bytes are being
    /// destuffed and committed to the attached packet buffer.
    InPacket,
}

/// What the receiver should do after feeding one bit to the decoder.
///
/// Externally the decoder only ever has two effects on the receiver: no
/// action, or "restart reception" (reset decoder state and re-issue
/// `start_rx`). Internally this enum also distinguishes *why* a restart
/// is warranted (packet handed off vs. packet aborted) and flags the
/// moment of preamble acquisition, so the receiver knows when to stamp
/// the in-progress buffer's channel and whether to push a completed
/// packet before restarting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeAction {
    /// Nothing for the receiver to do this tick.
    NoAction,
    /// The preamble + start flag just matched; the receiver should stamp
    /// the attached buffer's channel. Corresponds to `NO_ACTION` in the
    /// external contract.
    Synced,
    /// The closing flag was found; the attached buffer holds a complete
    /// packet ready for hand-off. Corresponds to `RESTART_RX`.
    Complete,
    /// Seven consecutive one-bits, or the packet would overflow
    /// `MAX_AIS_RX_PACKET_SIZE`. Corresponds to `RESTART_RX`.
    Abort,
}

/// NRZI line decoder plus HDLC bit-destuffer and flag detector.
pub struct Decoder {
    prev_line_bit: Option<u8>,
    bit_window: u16,
    state: ReceiverState,
    ones_run: u8,
    rx_byte: u8,
    bit_count: u8,
}

impl Decoder {
    pub const fn new() -> Self {
        Self {
            prev_line_bit: None,
            bit_window: 0,
            state: ReceiverState::PreambleSync,
            ones_run: 0,
            rx_byte: 0,
            bit_count: 0,
        }
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Resets all decoder state to its just-initialized values. Called
    /// whenever the receiver restarts reception, including after every
    /// `Complete` or `Abort`.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds one raw (line-coded) sample to the decoder, appending
    /// destuffed payload bits to `packet` while in `InPacket` state.
    pub fn process_bit(&mut self, line_bit: u8, packet: &mut PacketBuffer) -> DecodeAction {
        let Some(prev) = self.prev_line_bit else {
            self.prev_line_bit = Some(line_bit);
            return DecodeAction::NoAction;
        };
        let decoded = (!(prev ^ line_bit)) & 1;
        self.prev_line_bit = Some(line_bit);

        match self.state {
            ReceiverState::PreambleSync => {
                self.bit_window = (self.bit_window << 1) | decoded as u16;
                if self.bit_window == PREAMBLE_FLAG_EVEN || self.bit_window == PREAMBLE_FLAG_ODD {
                    self.state = ReceiverState::InPacket;
                    self.ones_run = 0;
                    self.rx_byte = 0;
                    self.bit_count = 0;
                    DecodeAction::Synced
                } else {
                    DecodeAction::NoAction
                }
            }
            ReceiverState::InPacket => {
                // A packet can never legally carry seven consecutive
                // one-bits; this check reacts to the count accumulated
                // by prior bits, i.e. one tick after the seventh one was
                // appended, matching the source firmware's ordering.
                if packet.len() >= crate::config::MAX_AIS_RX_PACKET_SIZE || self.ones_run >= 7 {
                    // State stays `InPacket` here, same as the source
                    // firmware: it is the receiver's subsequent call to
                    // `reset()` (via `start_receiving`) that returns the
                    // decoder to `PreambleSync`, not this check itself.
                    return DecodeAction::Abort;
                }

                self.bit_window = (self.bit_window << 1) | decoded as u16;
                if (self.bit_window & 0xFF) == HDLC_FLAG {
                    self.state = ReceiverState::PreambleSync;
                    DecodeAction::Complete
                } else {
                    self.append_bit(decoded, packet);
                    DecodeAction::NoAction
                }
            }
        }
    }

    /// Bit-destuffing: drops a `0` that follows five consecutive `1`s,
    /// packs surviving bits MSB-first into a running byte, and commits
    /// one byte to `packet` every eight bits.
    fn append_bit(&mut self, bit: u8, packet: &mut PacketBuffer) {
        let keep = if bit == 1 {
            self.ones_run += 1;
            true
        } else {
            let stuffed = self.ones_run == 5;
            self.ones_run = 0;
            !stuffed
        };

        if keep {
            self.rx_byte = (self.rx_byte << 1) | bit;
            self.bit_count += 1;
        }

        if self.bit_count == 8 {
            // The packet-length guard at the top of `process_bit` keeps
            // this byte always within capacity.
            let _ = packet.push_byte(self.rx_byte);
            self.rx_byte = 0;
            self.bit_count = 0;
        }
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
