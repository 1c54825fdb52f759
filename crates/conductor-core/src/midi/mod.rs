//! MIDI byte codec.
//!
//! Messages are carried as a fixed 4-byte [`MidiDataByte`] word so they can
//! travel inside realtime events. Values are 7-bit on the wire and
//! normalized to `[0, 1]` (pitch bend `[-1, 1]`) everywhere else. Parsing
//! and serialization go through [`midi_msg`].

mod decoder;
mod encoder;

pub use decoder::*;
pub use encoder::*;

pub use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};

use crate::types::MidiDataByte;

/// Highest 7-bit value: velocity, pressure, controller value.
pub const MAX_VALUE: u8 = 127;

/// Pitch bend is a 14-bit value.
pub const MAX_PITCH_BEND: u16 = 16384;

pub const PITCH_BEND_MIDDLE: u16 = 8192;

/// Controllers above this number are channel mode messages.
pub const MAX_CONTROLLER_NO: u8 = 119;

pub const MOD_WHEEL_CONTROLLER_NO: u8 = 1;

/// Pseudo channel meaning "all channels". Only valid for input routing.
pub const OMNI: u8 = 16;

/// Copies up to 4 bytes of raw MIDI into a [`MidiDataByte`].
pub fn to_midi_data_byte(data: &[u8]) -> MidiDataByte {
    let mut word = [0u8; 4];
    let len = data.len().min(word.len());
    word[..len].copy_from_slice(&data[..len]);
    word
}
