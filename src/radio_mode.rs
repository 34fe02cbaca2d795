//! The process-wide receive/transmit flag, shared with the transmit
//! subsystem.
//!
//! The original firmware reads this through a bare global (`gRadioState`).
//! Re-architected here as an explicit capability: an atomic cell handed
//! to the [`crate::receiver::Receiver`] by reference at construction
//! time, so the coupling between receive and transmit is visible in the
//! type signature and the receiver is testable without any process-wide
//! state.

use core::sync::atomic::{AtomicU8, Ordering};

/// Whether the radio line currently carries receive data or transmit
/// data. Mutated only by the transmit subsystem; read-only from the
/// receiver's perspective.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum RadioMode {
    Receiving = 0,
    Transmitting = 1,
}

impl RadioMode {
    const fn from_u8(v: u8) -> Self {
        match v {
            1 => RadioMode::Transmitting,
            _ => RadioMode::Receiving,
        }
    }
}

/// An atomic cell holding the current [`RadioMode`], safe to share
/// between the transmit subsystem (writer) and the receive ISR path
/// (reader) without locks.
pub struct RadioModeCell(AtomicU8);

impl RadioModeCell {
    pub const fn new(mode: RadioMode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    pub fn load(&self) -> RadioMode {
        RadioMode::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn store(&self, mode: RadioMode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}

impl Default for RadioModeCell {
    fn default() -> Self {
        Self::new(RadioMode::Receiving)
    }
}
