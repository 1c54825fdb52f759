//! Error types for MIDI routing.

use thiserror::Error;

/// Reasons a connect or disconnect call was rejected. A rejected call
/// leaves every routing table unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiDispatcherError {
    #[error("Invalid MIDI input port or channel")]
    InvalidMidiInput,

    #[error("Invalid MIDI output port")]
    InvalidMidiOutput,

    #[error("Processor not found")]
    InvalidProcessor,

    #[error("Track not found")]
    InvalidTrack,

    #[error("Invalid parameter or controller number")]
    InvalidParameter,

    #[error("Invalid MIDI channel")]
    InvalidChannel,
}

pub type Result<T> = std::result::Result<T, MidiDispatcherError>;
