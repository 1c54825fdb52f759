//! Planar multichannel audio buffer.
//!
//! All channels share one allocation made up front, so processing never
//! allocates. Ramps interpolate linearly from the first to the last sample of
//! the buffer, which is what bypass crossfades and gain changes rely on.

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channel_count: usize,
    frames: usize,
    data: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(channel_count: usize, frames: usize) -> Self {
        Self {
            channel_count,
            frames,
            data: vec![0.0; channel_count * frames],
        }
    }

    /// Builds a buffer from per-channel sample slices of equal length.
    pub fn from_channels(channels: &[&[f32]]) -> Self {
        let frames = channels.first().map_or(0, |c| c.len());
        let mut buffer = Self::new(channels.len(), frames);
        for (index, channel) in channels.iter().enumerate() {
            debug_assert_eq!(channel.len(), frames);
            buffer.channel_mut(index).copy_from_slice(&channel[..frames]);
        }
        buffer
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.data[channel * self.frames..(channel + 1) * self.frames]
    }

    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.data[channel * self.frames..(channel + 1) * self.frames]
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn clear_channel(&mut self, channel: usize) {
        self.channel_mut(channel).fill(0.0);
    }

    pub fn apply_gain(&mut self, gain: f32) {
        self.data.iter_mut().for_each(|s| *s *= gain);
    }

    /// Copies `source_channel` of `source` into `dest_channel`.
    pub fn replace_channel(&mut self, dest_channel: usize, source_channel: usize, source: &SampleBuffer) {
        debug_assert_eq!(self.frames, source.frames);
        self.channel_mut(dest_channel)
            .copy_from_slice(source.channel(source_channel));
    }

    /// Copies all channels. A mono source is copied into every channel.
    pub fn replace(&mut self, source: &SampleBuffer) {
        debug_assert!(source.channel_count == 1 || source.channel_count == self.channel_count);
        for channel in 0..self.channel_count {
            let source_channel = if source.channel_count == 1 { 0 } else { channel };
            self.replace_channel(channel, source_channel, source);
        }
    }

    pub fn add_with_gain(&mut self, source: &SampleBuffer, gain: f32) {
        debug_assert!(source.channel_count == 1 || source.channel_count == self.channel_count);
        for channel in 0..self.channel_count {
            let source_channel = if source.channel_count == 1 { 0 } else { channel };
            self.channel_mut(channel)
                .iter_mut()
                .zip(source.channel(source_channel))
                .for_each(|(d, s)| *d += s * gain);
        }
    }

    pub fn add(&mut self, source: &SampleBuffer) {
        self.add_with_gain(source, 1.0);
    }

    /// Adds one channel of `source` with a gain ramping from `start` to `end`.
    pub fn add_with_ramp(
        &mut self,
        dest_channel: usize,
        source_channel: usize,
        source: &SampleBuffer,
        start: f32,
        end: f32,
    ) {
        let inc = ramp_increment(start, end, self.frames);
        self.channel_mut(dest_channel)
            .iter_mut()
            .zip(source.channel(source_channel))
            .enumerate()
            .for_each(|(i, (d, s))| *d += s * (start + i as f32 * inc));
    }

    /// Multiplies every channel by a gain ramping from `start` to `end`.
    pub fn ramp(&mut self, start: f32, end: f32) {
        let frames = self.frames;
        let inc = ramp_increment(start, end, frames);
        for channel in 0..self.channel_count {
            self.channel_mut(channel)
                .iter_mut()
                .enumerate()
                .for_each(|(i, s)| *s *= start + i as f32 * inc);
        }
    }

    /// Largest absolute sample value across all channels.
    pub fn peak(&self) -> f32 {
        self.data.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
    }

    pub fn from_interleaved(&mut self, interleaved: &[f32]) {
        debug_assert_eq!(interleaved.len(), self.channel_count * self.frames);
        let channels = self.channel_count;
        for (frame, samples) in interleaved.chunks_exact(channels).enumerate() {
            for (channel, sample) in samples.iter().enumerate() {
                self.data[channel * self.frames + frame] = *sample;
            }
        }
    }

    pub fn to_interleaved(&self, interleaved: &mut [f32]) {
        debug_assert_eq!(interleaved.len(), self.channel_count * self.frames);
        let channels = self.channel_count;
        for (frame, samples) in interleaved.chunks_exact_mut(channels).enumerate() {
            for (channel, sample) in samples.iter_mut().enumerate() {
                *sample = self.data[channel * self.frames + frame];
            }
        }
    }
}

#[inline]
fn ramp_increment(start: f32, end: f32, frames: usize) -> f32 {
    if frames > 1 {
        (end - start) / (frames - 1) as f32
    } else {
        0.0
    }
}
