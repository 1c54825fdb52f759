//! Click-free bypass transitions.
//!
//! ```text
//! NotBypassed ──set_bypass(true)──▶ RampingDown ──ramp ends──▶ Bypassed
//!      ▲                                                          │
//!      └────────ramp ends──── RampingUp ◀──set_bypass(false)──────┘
//! ```
//!
//! Ramps are counted in whole audio chunks. Every call to
//! [`ramp_output`](BypassManager::ramp_output) or
//! [`crossfade_output`](BypassManager::crossfade_output) advances the ramp by
//! one chunk.

use crate::config::{DEFAULT_AUDIO_CHUNK_SIZE, DEFAULT_BYPASS_RAMP_TIME};
use crate::sample_buffer::SampleBuffer;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BypassState {
    NotBypassed,
    Bypassed,
    RampingDown,
    RampingUp,
}

#[derive(Debug)]
pub struct BypassManager {
    state: BypassState,
    ramp_chunks: u32,
    ramp_count: u32,
    ramp_time: Duration,
    chunk_size: usize,
}

impl BypassManager {
    pub fn new() -> Self {
        Self::with_bypassed(false)
    }

    pub fn with_bypassed(bypassed_by_default: bool) -> Self {
        Self {
            state: if bypassed_by_default {
                BypassState::Bypassed
            } else {
                BypassState::NotBypassed
            },
            ramp_chunks: 0,
            ramp_count: 0,
            ramp_time: DEFAULT_BYPASS_RAMP_TIME,
            chunk_size: DEFAULT_AUDIO_CHUNK_SIZE,
        }
    }

    /// Overrides the crossfade time and chunk size used to compute ramp lengths.
    pub fn with_ramp(mut self, ramp_time: Duration, chunk_size: usize) -> Self {
        debug_assert!(chunk_size > 0);
        self.ramp_time = ramp_time;
        self.chunk_size = chunk_size;
        self
    }

    #[inline]
    pub fn state(&self) -> BypassState {
        self.state
    }

    /// True once bypass has been requested, including while ramping down.
    #[inline]
    pub fn bypassed(&self) -> bool {
        matches!(self.state, BypassState::Bypassed | BypassState::RampingDown)
    }

    pub fn set_bypass(&mut self, bypass_enabled: bool, sample_rate: f32) {
        if bypass_enabled && !self.bypassed() {
            self.state = BypassState::RampingDown;
            self.ramp_chunks = self.chunks_to_ramp(sample_rate);
            self.ramp_count = self.ramp_chunks;
        } else if !bypass_enabled && self.bypassed() {
            self.state = BypassState::RampingUp;
            self.ramp_chunks = self.chunks_to_ramp(sample_rate);
            self.ramp_count = 0;
        }
    }

    /// Jumps to the final state without ramping. Only for use while audio is
    /// not running.
    pub fn set_bypass_immediately(&mut self, bypass_enabled: bool) {
        self.state = if bypass_enabled {
            BypassState::Bypassed
        } else {
            BypassState::NotBypassed
        };
        self.ramp_count = 0;
    }

    /// False only when fully bypassed.
    #[inline]
    pub fn should_process(&self) -> bool {
        self.state != BypassState::Bypassed
    }

    #[inline]
    pub fn should_ramp(&self) -> bool {
        matches!(self.state, BypassState::RampingDown | BypassState::RampingUp)
    }

    /// Number of chunks a ramp lasts at `sample_rate`.
    pub fn chunks_to_ramp(&self, sample_rate: f32) -> u32 {
        let chunks = sample_rate * self.ramp_time.as_secs_f32() / self.chunk_size as f32;
        (chunks.round() as u32).max(1)
    }

    /// Start and end gain for the current chunk. Advances the ramp.
    pub fn get_ramp(&mut self) -> (f32, f32) {
        let prev_count = match self.state {
            BypassState::RampingDown => {
                let prev = self.ramp_count;
                self.ramp_count = self.ramp_count.saturating_sub(1);
                if self.ramp_count == 0 {
                    self.state = BypassState::Bypassed;
                }
                prev
            }
            BypassState::RampingUp => {
                let prev = self.ramp_count;
                self.ramp_count = (self.ramp_count + 1).min(self.ramp_chunks);
                if self.ramp_count == self.ramp_chunks {
                    self.state = BypassState::NotBypassed;
                }
                prev
            }
            _ => return (1.0, 1.0),
        };
        let chunks = self.ramp_chunks as f32;
        (prev_count as f32 / chunks, self.ramp_count as f32 / chunks)
    }

    pub fn ramp_output(&mut self, output: &mut SampleBuffer) {
        let (start, end) = self.get_ramp();
        output.ramp(start, end);
    }

    /// Ramps the processed `output` and mixes in `input` with the inverse
    /// ramp. Input channels wrap around when there are fewer than outputs.
    pub fn crossfade_output(
        &mut self,
        input: &SampleBuffer,
        output: &mut SampleBuffer,
        input_channels: usize,
        output_channels: usize,
    ) {
        let (start, end) = self.get_ramp();
        output.ramp(start, end);
        if input_channels > 0 {
            for c in 0..output_channels {
                output.add_with_ramp(c, c % input_channels, input, 1.0 - start, 1.0 - end);
            }
        }
    }
}

impl Default for BypassManager {
    fn default() -> Self {
        Self::new()
    }
}
