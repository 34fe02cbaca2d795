//! Ambient-noise floor estimation from periodic RSSI samples.
//!
//! The distilled spec names `NoiseFloorDetector` as a leaf collaborator
//! (`report(channel_char, rssi_u8)`) but leaves its update rule
//! unspecified. An exponential moving average, seeded on first sample,
//! is the natural O(1) no-history choice for a consumer fed from ISR
//! context: no allocation, no unbounded history, one multiply-add per
//! sample.

/// Per-channel noise floor telemetry sink. Implemented as a trait so the
/// receiver core has no concrete dependency on a particular statistics
/// or telemetry implementation; `EmaNoiseFloor` below is the default one.
pub trait NoiseFloorDetector {
    fn report(&mut self, channel: char, rssi: u8);
}

/// Exponential-moving-average noise floor estimate, one channel's worth
/// of state per AIS channel (A and B).
pub struct EmaNoiseFloor {
    // Index 0 = channel A, index 1 = channel B, matching `VhfChannel::ordinal`.
    estimate: [Option<f32>; 2],
    alpha: f32,
}

impl EmaNoiseFloor {
    /// `alpha` is the smoothing factor in `(0.0, 1.0]`; smaller values
    /// track the floor more slowly and reject more transient noise.
    pub const fn new(alpha: f32) -> Self {
        Self {
            estimate: [None, None],
            alpha,
        }
    }

    fn index(channel: char) -> usize {
        usize::from(channel != 'A')
    }

    /// Current floor estimate for `channel`, or `None` if no sample has
    /// ever been reported for it.
    pub fn floor(&self, channel: char) -> Option<f32> {
        self.estimate[Self::index(channel)]
    }
}

impl Default for EmaNoiseFloor {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl NoiseFloorDetector for EmaNoiseFloor {
    fn report(&mut self, channel: char, rssi: u8) {
        let slot = &mut self.estimate[Self::index(channel)];
        let sample = rssi as f32;
        *slot = Some(match *slot {
            Some(prev) => prev + self.alpha * (sample - prev),
            None => sample,
        });
    }
}
