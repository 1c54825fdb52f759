//! Lock-free cells shared between the audio thread and control threads.
//!
//! Parameter values and chunk timestamps are written on one side and read on
//! the other. Each cell sits on its own cache line so that neighbouring
//! parameters written by the audio thread don't false-share with reads from
//! control threads.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache-line aligned atomic f32.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

impl Clone for AtomicFloat {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl Default for AtomicFloat {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Duration stored as whole microseconds.
#[derive(Debug, Default)]
pub struct AtomicTime {
    micros: AtomicU64,
}

impl AtomicTime {
    pub fn new(value: Duration) -> Self {
        Self {
            micros: AtomicU64::new(value.as_micros() as u64),
        }
    }

    #[inline]
    pub fn get(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, value: Duration) {
        self.micros.store(value.as_micros() as u64, Ordering::Release);
    }
}
