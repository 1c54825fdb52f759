//! Conversion between wall-clock timestamps and sample offsets.
//!
//! The audio thread reports the start time of each chunk. Events timestamped
//! within the next chunk get a sample offset inside it; later events must
//! wait for a later chunk.

use crate::lockfree::AtomicTime;
use crate::types::{Time, IMMEDIATE_PROCESS};
use std::time::Duration;

fn chunk_time(sample_rate: f32, chunk_size: usize) -> Duration {
    let micros = (1_000_000.0 / sample_rate as f64 * chunk_size as f64).round();
    Duration::from_micros(micros as u64)
}

#[derive(Debug)]
pub struct EventTimer {
    chunk_size: usize,
    chunk_time: AtomicTime,
    incoming_chunk_time: AtomicTime,
    outgoing_chunk_time: AtomicTime,
}

impl EventTimer {
    pub fn new(sample_rate: f32, chunk_size: usize) -> Self {
        Self {
            chunk_size,
            chunk_time: AtomicTime::new(chunk_time(sample_rate, chunk_size)),
            incoming_chunk_time: AtomicTime::new(IMMEDIATE_PROCESS),
            outgoing_chunk_time: AtomicTime::new(IMMEDIATE_PROCESS),
        }
    }

    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.chunk_time.set(chunk_time(sample_rate, self.chunk_size));
    }

    #[inline]
    pub fn chunk_time(&self) -> Duration {
        self.chunk_time.get()
    }

    /// Start time of the chunk currently being prepared for the audio thread.
    pub fn set_incoming_time(&self, timestamp: Time) {
        self.incoming_chunk_time.set(timestamp + self.chunk_time());
    }

    /// Start time of the chunk whose output events are being collected.
    pub fn set_outgoing_time(&self, timestamp: Time) {
        self.outgoing_chunk_time.set(timestamp + self.chunk_time());
    }

    /// `Some(offset)` if `timestamp` falls before the end of the next chunk,
    /// `None` if the event belongs to a later chunk.
    pub fn sample_offset_from_realtime(&self, timestamp: Time) -> Option<usize> {
        let chunk_start = self.incoming_chunk_time.get();
        if timestamp <= chunk_start {
            return Some(0);
        }
        let diff = timestamp - chunk_start;
        let chunk_time = self.chunk_time();
        if diff < chunk_time {
            let offset = self.chunk_size as u128 * diff.as_nanos() / chunk_time.as_nanos();
            Some(offset as usize)
        } else {
            None
        }
    }

    pub fn real_time_from_sample_offset(&self, offset: usize) -> Time {
        self.outgoing_chunk_time.get() + self.chunk_time() * offset as u32 / self.chunk_size as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_time() {
        let timer = EventTimer::new(48000.0, 64);
        assert_eq!(timer.chunk_time(), Duration::from_micros(1333));
    }

    #[test]
    fn test_immediate_and_past_events_get_offset_zero() {
        let timer = EventTimer::new(48000.0, 64);
        timer.set_incoming_time(Duration::from_secs(1));
        assert_eq!(timer.sample_offset_from_realtime(IMMEDIATE_PROCESS), Some(0));
        assert_eq!(
            timer.sample_offset_from_realtime(Duration::from_millis(500)),
            Some(0)
        );
    }

    #[test]
    fn test_offset_within_next_chunk() {
        let timer = EventTimer::new(48000.0, 64);
        timer.set_incoming_time(Duration::ZERO);
        let start = timer.chunk_time();
        let offset = timer
            .sample_offset_from_realtime(start + timer.chunk_time() / 2)
            .unwrap();
        assert!((31..=32).contains(&offset));
    }

    #[test]
    fn test_future_event_is_deferred() {
        let timer = EventTimer::new(48000.0, 64);
        timer.set_incoming_time(Duration::ZERO);
        assert_eq!(
            timer.sample_offset_from_realtime(Duration::from_millis(100)),
            None
        );
    }

    #[test]
    fn test_real_time_from_sample_offset() {
        let timer = EventTimer::new(48000.0, 64);
        timer.set_outgoing_time(Duration::from_secs(2));
        let t0 = timer.real_time_from_sample_offset(0);
        let t32 = timer.real_time_from_sample_offset(32);
        assert_eq!(t0, Duration::from_secs(2) + timer.chunk_time());
        assert!(t32 > t0);
    }

    #[test]
    fn test_set_sample_rate_updates_chunk_time() {
        let timer = EventTimer::new(48000.0, 64);
        timer.set_sample_rate(96000.0);
        assert_eq!(timer.chunk_time(), Duration::from_micros(667));
    }
}
