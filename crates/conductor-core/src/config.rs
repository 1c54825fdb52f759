//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;
pub const DEFAULT_AUDIO_CHUNK_SIZE: usize = 64;
pub const DEFAULT_BYPASS_RAMP_TIME: Duration = Duration::from_millis(10);
pub const DEFAULT_RT_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_HANDOFF_CAPACITY: usize = 256;

/// Settings shared by the dispatcher, the MIDI router and processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per audio callback.
    pub audio_chunk_size: usize,
    /// Length of the bypass crossfade.
    pub bypass_ramp_time: Duration,
    /// Capacity of each realtime event FIFO.
    pub rt_queue_capacity: usize,
    /// Number of payloads that can be in flight towards the audio thread.
    pub handoff_capacity: usize,
    /// Sleep between dispatcher loop iterations.
    pub dispatcher_period: Duration,
    /// Sleep between worker loop iterations.
    pub worker_period: Duration,
    pub midi_inputs: usize,
    pub midi_outputs: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            audio_chunk_size: DEFAULT_AUDIO_CHUNK_SIZE,
            bypass_ramp_time: DEFAULT_BYPASS_RAMP_TIME,
            rt_queue_capacity: DEFAULT_RT_QUEUE_CAPACITY,
            handoff_capacity: DEFAULT_HANDOFF_CAPACITY,
            dispatcher_period: Duration::from_millis(1),
            worker_period: Duration::from_millis(1),
            midi_inputs: 1,
            midi_outputs: 1,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if !self.audio_chunk_size.is_power_of_two() || !(8..=2048).contains(&self.audio_chunk_size)
        {
            return Err(Error::InvalidConfig(format!(
                "audio_chunk_size {} must be a power of two between 8 and 2048",
                self.audio_chunk_size
            )));
        }
        if self.rt_queue_capacity == 0 || self.handoff_capacity == 0 {
            return Err(Error::InvalidConfig(
                "queue capacities must be non-zero".to_string(),
            ));
        }
        if self.dispatcher_period.is_zero() || self.worker_period.is_zero() {
            return Err(Error::InvalidConfig(
                "thread periods must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_chunk_size(mut self, audio_chunk_size: usize) -> Self {
        self.audio_chunk_size = audio_chunk_size;
        self
    }

    pub fn with_midi_ports(mut self, inputs: usize, outputs: usize) -> Self {
        self.midi_inputs = inputs;
        self.midi_outputs = outputs;
        self
    }
}
