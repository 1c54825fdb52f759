//! MIDI routing for the conductor plugin host.
//!
//! # Primary API
//!
//! - [`MidiDispatcher`]: Routes MIDI input to parameters, programs and tracks, and track output to ports
//! - [`MidiFrontend`]: The MIDI ports on the other side of the dispatcher
//! - [`CcInputConnection`] / [`KbInputConnection`] / [`KbOutputConnection`]: Route snapshots
//!
//! # Example
//!
//! ```
//! use conductor_core::{EngineConfig, Event, EventSink, ObjectId, ProcessorContainer, IMMEDIATE_PROCESS};
//! use conductor_midi::{MidiDispatcher, OMNI};
//! use std::sync::{Arc, Mutex};
//!
//! struct Engine;
//!
//! impl ProcessorContainer for Engine {
//!     fn processor_id(&self, name: &str) -> Option<ObjectId> {
//!         (name == "synth").then_some(1)
//!     }
//!     fn parameter_id(&self, _processor_id: ObjectId, name: &str) -> Option<ObjectId> {
//!         (name == "cutoff").then_some(4)
//!     }
//!     fn track_id(&self, _name: &str) -> Option<ObjectId> {
//!         None
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Events(Mutex<Vec<Event>>);
//!
//! impl EventSink for Events {
//!     fn post_event(&self, event: Event) {
//!         self.0.lock().unwrap().push(event);
//!     }
//! }
//!
//! let events = Arc::new(Events::default());
//! let midi = MidiDispatcher::new(&EngineConfig::default(), events.clone(), Arc::new(Engine));
//! midi.connect_cc_to_parameter(0, "synth", "cutoff", 74, 0.0, 1.0, false, OMNI).unwrap();
//!
//! midi.send_midi(0, &[0xB3, 74, 127], IMMEDIATE_PROCESS);
//! assert_eq!(events.0.lock().unwrap().len(), 1);
//! ```

pub mod error;
pub use error::{MidiDispatcherError, Result};

pub mod connection;
pub use connection::{
    CcInputConnection, InputConnection, KbInputConnection, KbOutputConnection, OutputConnection,
    PcInputConnection, RELATIVE_CC_START,
};

pub mod dispatcher;
pub use dispatcher::{MidiDispatcher, MidiFrontend};

pub use conductor_core::midi::{self as codec, MAX_CONTROLLER_NO, OMNI};
