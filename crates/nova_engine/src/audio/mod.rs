//! Audio collaborator boundary
//!
//! Playback components hold pre-decoded buffers and hand them to whatever
//! [`AudioSink`] the driver plugs in. Mixing and DSP live outside this
//! crate; audio owns no hierarchy state.

use std::sync::Arc;

/// Pre-decoded PCM buffer
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Buffer name (asset identity)
    pub name: String,

    /// Interleaved samples in `[-1, 1]`
    pub samples: Arc<[f32]>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of interleaved channels
    pub channels: u16,
}

impl AudioBuffer {
    /// Create a buffer from pre-decoded samples
    pub fn new(name: impl Into<String>, samples: Arc<[f32]>, sample_rate: u32, channels: u16) -> Self {
        Self {
            name: name.into(),
            samples,
            sample_rate,
            channels,
        }
    }

    /// Duration of the buffer in seconds
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / (self.sample_rate as f32 * f32::from(self.channels))
    }
}

/// Contract implemented by the platform audio output
pub trait AudioSink: Send + Sync {
    /// Start playback of a buffer at the given volume in `[0, 1]`
    fn play(&self, buffer: &AudioBuffer, volume: f32, looped: bool);

    /// Stop every playback started from the given buffer
    fn stop(&self, buffer: &AudioBuffer);
}
