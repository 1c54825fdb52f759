//! Realtime core of the conductor plugin host.
//!
//! # Primary API
//!
//! - [`Event`] / [`RtEvent`]: Control-domain and realtime events
//! - [`EventDispatcher`]: Routes events between control threads and the audio thread
//! - [`Processor`] / [`ProcessorBase`]: Contract every audio processor implements
//! - [`InternalPlugin`]: Parameter storage and state handling for built-in processors
//! - [`BypassManager`] and [`ValueSmoother`]: Click-free bypass and parameter smoothing
//! - [`midi`]: Raw MIDI decoding and encoding
//!
//! Nothing on the audio thread allocates, locks or blocks: events travel
//! through fixed-capacity FIFOs and owned payloads are parked in a
//! [`HandoffStore`] until the worker thread frees them.
//!
//! # Example
//!
//! ```
//! use conductor_core::{GainPlugin, Processor, SampleBuffer};
//!
//! let mut gain = GainPlugin::new().unwrap();
//! gain.init(48000.0).unwrap();
//!
//! let input = SampleBuffer::from_channels(&[&[0.5; 64], &[0.5; 64]]);
//! let mut output = SampleBuffer::new(2, 64);
//! gain.process_audio(&input, &mut output);
//! assert_eq!(output, input);
//! ```

pub mod error;
pub use error::{Error, EventDispatcherError, ProcessorError, ProcessorResult, Result};

pub mod types;
pub use types::{
    BlobData, EventId, EventIdGenerator, MidiDataByte, ObjectId, PlayingMode, ProcessorIdGenerator,
    SyncMode, Time, TimeSignature, IMMEDIATE_PROCESS,
};

pub mod config;
pub use config::{
    EngineConfig, DEFAULT_AUDIO_CHUNK_SIZE, DEFAULT_BYPASS_RAMP_TIME, DEFAULT_HANDOFF_CAPACITY,
    DEFAULT_RT_QUEUE_CAPACITY, DEFAULT_SAMPLE_RATE,
};

pub(crate) mod lockfree;
pub use lockfree::{AtomicFloat, AtomicTime};

pub mod event;
pub use event::{
    AsyncWork, AsyncWorkCallback, AudioGraphAction, ClipChannelType, CompletionCallback,
    EngineNotification, Event, EventKind, EventStatus, KeyboardEvent, KeyboardEventType, Lambda,
    NotifyAction, ParameterChange, ParameterChangeNotification, ParameterChangeType, PosterId,
    PropertyChangeNotification, RtEvent, RtEventKind, MAX_POSTERS,
};

pub mod handoff;
pub use handoff::{Handoff, HandoffId, HandoffStore};

pub mod state;
pub use state::{ProcessorState, RtState};

pub mod connection;
pub use connection::{
    connection_storage, AudioConnection, ConnectionStorage, CvConnection, GateConnection,
    RtConnections,
};

pub mod rt_fifo;
pub use rt_fifo::{
    rt_event_fifo, rt_event_fifo_with_capacity, RtEventConsumer, RtEventPipe, RtEventProducer,
    MAX_EVENTS_IN_QUEUE,
};

pub mod event_timer;
pub use event_timer::EventTimer;

pub mod dispatcher;
pub use dispatcher::{EngineHandler, EventDispatcher, EventPoster, EventSink};

pub mod parameter;
pub use parameter::{Direction, ParameterDescriptor, ParameterType, ParameterValue, PreProcessor};

pub mod sample_buffer;
pub use sample_buffer::SampleBuffer;

pub mod bypass;
pub use bypass::{BypassManager, BypassState};

pub mod smooth;
pub use smooth::{
    SmoothingMode, ValueSmoother, ValueSmootherExpRamp, ValueSmootherFilter, ValueSmootherRamp,
};

pub mod midi;

pub mod processor;
pub use processor::{
    HostControl, Processor, ProcessorBase, ProcessorContainer, MAX_CV_OUTPUTS, MAX_GATE_NOTE_NO,
    MAX_GATE_OUTPUTS,
};

pub mod plugin;
pub use plugin::InternalPlugin;

pub mod plugins;
pub use plugins::{GainPlugin, PassthroughPlugin};
