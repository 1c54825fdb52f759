//! Centralized error type for the conductor umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] conductor_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] conductor_midi::MidiDispatcherError),

    #[error("Dispatcher: {0}")]
    Dispatcher(#[from] conductor_core::EventDispatcherError),

    #[error("Processor: {0}")]
    Processor(#[from] conductor_core::ProcessorError),
}

pub type Result<T> = std::result::Result<T, Error>;
