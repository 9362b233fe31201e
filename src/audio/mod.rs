//! Audio capture feeding the metering pipeline.
//!
//! Samples arrive on CPAL's callback thread, are converted to `f32`, cut into
//! fixed-length blocks and pushed over a bounded channel. A full channel drops
//! the block rather than stalling the audio thread.

/// Default capture sample rate (Hz).
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default block length in samples.
pub const DEFAULT_FRAGMENT: usize = 2048;

/// Default capacity of the block channel between capture and relay.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

mod capture;
mod dispatch;
#[cfg(test)]
mod tests;

pub use capture::{list_input_devices, CaptureStream};

/// Stream parameters requested from the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per dispatched block (all channels, interleaved).
    pub fragment: usize,
    pub channel_capacity: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
            fragment: DEFAULT_FRAGMENT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl CaptureSettings {
    /// Fixed device buffer size in frames. CPAL counts frames, while
    /// `fragment` counts interleaved samples.
    pub fn buffer_frames(&self) -> u32 {
        let channels = usize::from(self.channels.max(1));
        u32::try_from((self.fragment / channels).max(1)).unwrap_or(u32::MAX)
    }
}
