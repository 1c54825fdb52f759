//! # Conductor - Realtime Plugin Host Core
//!
//! Event bridging between control threads and the audio thread, MIDI routing
//! and the processor contract for hosting audio plugins.
//!
//! ## Architecture
//!
//! Conductor is an umbrella crate that coordinates:
//! - **conductor-core** - Event model, realtime FIFOs, event dispatcher, processor contract, bypass and smoothing
//! - **conductor-midi** - MIDI routing (CC, program change, keyboard, raw MIDI, track outputs, clock)
//!
//! ## Quick Start
//!
//! ```ignore
//! use conductor::prelude::*;
//!
//! let host = Host::builder(engine.clone()).midi_ports(1, 1).build()?;
//! host.midi().connect_cc_to_parameter(0, "synth", "cutoff", 74, 0.0, 1.0, false, OMNI)?;
//! host.run()?;
//!
//! // On the audio thread
//! let mut queues = host.take_audio_queues().unwrap();
//! while let Some(event) = queues.events.pop() {
//!     synth.process_event(event);
//! }
//! ```

/// Re-export of conductor-core for direct access
pub use conductor_core as core;

/// Re-export of conductor-midi for direct access
pub use conductor_midi as midi;

pub use conductor_core::{
    BypassManager, BypassState, EngineConfig, EngineHandler, Event, EventDispatcher,
    EventDispatcherError, EventKind, EventPoster, EventSink, EventStatus, GainPlugin,
    InternalPlugin, KeyboardEvent, KeyboardEventType, ObjectId, ParameterChange,
    PassthroughPlugin, PosterId, Processor, ProcessorContainer, ProcessorError, ProcessorResult,
    ProcessorState, RtEvent, RtEventConsumer, RtEventKind, RtEventProducer, SampleBuffer, Time,
    ValueSmoother, IMMEDIATE_PROCESS,
};

pub use conductor_midi::{MidiDispatcher, MidiDispatcherError, MidiFrontend, OMNI};

mod builder;
mod engine;
mod error;

pub use builder::HostBuilder;
pub use engine::{AudioQueues, Host};
pub use error::{Error, Result};

/// Common imports.
pub mod prelude {
    pub use crate::{
        AudioQueues, EngineConfig, Event, EventKind, EventSink, EventStatus, Host, HostBuilder,
        KeyboardEvent, KeyboardEventType, MidiFrontend, ObjectId, Processor, ProcessorContainer,
        IMMEDIATE_PROCESS, OMNI,
    };
}
