//! Routing table entries and the read-only snapshots handed out by getters.

use conductor_core::midi::MAX_VALUE;
use conductor_core::ObjectId;
use serde::{Deserialize, Serialize};

/// Initial value of the virtual controller behind a relative CC connection.
pub const RELATIVE_CC_START: u8 = 64;

/// One destination of an input route. `target` is a processor id for CC and
/// program change routes and a track id for keyboard and raw routes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputConnection {
    pub target: ObjectId,
    pub parameter: ObjectId,
    pub min_range: f32,
    pub max_range: f32,
    pub relative: bool,
    /// Absolute value accumulated from relative CC messages.
    pub virtual_abs_value: u8,
}

impl InputConnection {
    pub fn to_target(target: ObjectId) -> Self {
        Self {
            target,
            parameter: 0,
            min_range: 0.0,
            max_range: 0.0,
            relative: false,
            virtual_abs_value: RELATIVE_CC_START,
        }
    }

    pub fn to_parameter(
        target: ObjectId,
        parameter: ObjectId,
        min_range: f32,
        max_range: f32,
        relative: bool,
    ) -> Self {
        Self {
            target,
            parameter,
            min_range,
            max_range,
            relative,
            virtual_abs_value: RELATIVE_CC_START,
        }
    }

    /// Absolute controller value for an incoming CC value.
    ///
    /// In relative mode values below 64 increment the virtual controller and
    /// values from 64 up decrement it (two's complement), clamped to 0..=127.
    pub fn absolute_value(&mut self, cc_value: u8) -> u8 {
        if !self.relative {
            return cc_value;
        }
        let current = self.virtual_abs_value;
        let next = if cc_value < 64 {
            current + cc_value.min(MAX_VALUE - current)
        } else {
            let decrease = 128 - cc_value as u16;
            current - decrease.min(current as u16) as u8
        };
        self.virtual_abs_value = next;
        next
    }

    /// Maps a 7-bit controller value into `[min_range, max_range]`.
    #[inline]
    pub fn map_value(&self, abs_value: u8) -> f32 {
        abs_value as f32 / MAX_VALUE as f32 * (self.max_range - self.min_range) + self.min_range
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConnection {
    pub output: usize,
    pub channel: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcInputConnection {
    pub input_connection: InputConnection,
    pub port: usize,
    pub channel: u8,
    pub cc: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcInputConnection {
    pub processor_id: ObjectId,
    pub port: usize,
    pub channel: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KbInputConnection {
    pub input_connection: InputConnection,
    pub port: usize,
    pub channel: u8,
    /// Connection forwards undecoded MIDI.
    pub raw_midi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbOutputConnection {
    pub track_id: ObjectId,
    pub port: usize,
    pub channel: u8,
}
