//! `RadioIc`: the subset of the radio transceiver driver's command
//! surface the receive core invokes, and the parameters of the one
//! command it issues repeatedly.
//!
//! The SPI wire protocol used to implement these operations is an
//! external collaborator out of scope for the core receive state
//! machine; `RadioIc` only names the operations and their documented
//! maximum durations so [`crate::receiver::Receiver`] can be written
//! and tested against any implementation. [`ezradiopro`] is the one
//! concrete driver shipped with this crate.

pub mod ezradiopro;

use crate::channel::VhfChannel;

/// Parameters for the non-blocking receive-start command. Field layout
/// mirrors the radio IC's `RX_OPTIONS` command payload: a channel index,
/// a start condition, an expected length (0 = unbounded, framing decides
/// completion), and three reserved next-state bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxOptions {
    pub channel: u8,
    pub condition: u8,
    pub rx_len: u8,
    pub next_state: [u8; 3],
}

impl RxOptions {
    /// The options used by every `start_rx` call this core ever makes:
    /// no start condition, no expected length (HDLC framing decides
    /// completion), no automatic state transitions.
    pub const fn for_channel(channel: VhfChannel) -> Self {
        Self {
            channel: channel.ordinal(),
            condition: 0,
            rx_len: 0,
            next_state: [0, 0, 0],
        }
    }
}

/// The radio driver operations the receive core calls from the
/// bit-clock ISR path. Every method here has a documented maximum
/// duration (see each method) that the implementation must honor, since
/// the core calls `start_rx` and `read_rssi` from interrupt context.
pub trait RadioIc {
    /// Transport or command-dispatch failure type.
    type Error;

    /// One-time post-reset radio configuration. Called from `init`,
    /// outside the ISR path; no duration budget.
    fn configure(&mut self) -> Result<(), Self::Error>;

    /// Sets GPIO1 to RX data and GPIO3 to RX/TX clock. Must complete in
    /// <= 140us.
    fn configure_gpios_for_rx(&mut self) -> Result<(), Self::Error>;

    /// Issues the non-blocking receive-start command. Must complete in
    /// <= 65us.
    fn start_rx(&mut self, options: RxOptions) -> Result<(), Self::Error>;

    /// Synchronously reads the current RSSI value. Must complete in
    /// <= 85us.
    fn read_rssi(&mut self) -> Result<u8, Self::Error>;
}
