//! Real-time receive core for a marine AIS (Automatic Identification
//! System) transponder's bit-clock pipeline.
//!
//! This crate owns everything that runs from the 9600Hz bit-clock
//! interrupt and the 37.5Hz SOTDMA slot-timer interrupt: NRZI line
//! decoding, HDLC flag framing and bit-destuffing, channel switching at
//! slot boundaries, and handing completed packets off to a lock-free
//! event queue for a deferred task to drain. It does not include the
//! SPI/GPIO transport to a specific radio IC beyond [`radio::ezradiopro`],
//! the SOTDMA transmit scheduler, or NMEA sentence encoding.
#![no_std]

pub mod channel;
pub mod config;
pub mod decoder;
pub mod event;
mod log;
pub mod noise_floor;
pub mod packet;
pub mod pool;
pub mod radio;
pub mod radio_mode;
pub mod receiver;
pub mod slot_timer;
pub mod stats;

pub use channel::VhfChannel;
pub use decoder::{DecodeAction, ReceiverState};
pub use event::{Event, EventKind, EventQueue};
pub use noise_floor::{EmaNoiseFloor, NoiseFloorDetector};
pub use packet::PacketBuffer;
pub use pool::{EventPool, PacketPool};
pub use radio::{RadioIc, RxOptions};
pub use radio_mode::{RadioMode, RadioModeCell};
pub use receiver::Receiver;
pub use slot_timer::SlotTimer;
pub use stats::Stats;
