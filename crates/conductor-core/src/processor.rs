//! The contract every node in the audio graph implements.
//!
//! ```text
//!  non-realtime                      realtime
//!  ────────────                      ────────
//!  init / configure                  process_event  (one RtEvent at a time)
//!  register_parameter                process_audio  (one chunk at a time)
//!  save_state / set_state ──RtEvent──▶ SetState
//!  parameter_value*       ◀─atomics── parameter writes
//! ```
//!
//! Shared behavior lives in [`ProcessorBase`], which implementations embed
//! and expose through [`Processor::base`].

use crate::connection::{CvConnection, GateConnection};
use crate::dispatcher::EventSink;
use crate::error::{ProcessorError, ProcessorResult};
use crate::event::{AsyncWork, AsyncWorkCallback, Event, NotifyAction, RtEvent};
use crate::handoff::{HandoffId, HandoffStore};
use crate::midi::{self, MessageType};
use crate::parameter::ParameterDescriptor;
use crate::rt_fifo::RtEventPipe;
use crate::sample_buffer::SampleBuffer;
use crate::state::ProcessorState;
use crate::types::{EventId, EventIdGenerator, MidiDataByte, ObjectId, ProcessorIdGenerator};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// CV outputs a single processor can drive.
pub const MAX_CV_OUTPUTS: usize = 4;

/// Gate outputs a single processor can drive.
pub const MAX_GATE_OUTPUTS: usize = 8;

pub const MAX_GATE_NOTE_NO: u8 = 127;

/// Engine services available to processors.
#[derive(Clone)]
pub struct HostControl {
    sink: Arc<dyn EventSink>,
    handoff: Arc<HandoffStore>,
}

impl HostControl {
    pub fn new(sink: Arc<dyn EventSink>, handoff: Arc<HandoffStore>) -> Self {
        Self { sink, handoff }
    }

    /// Non-realtime only.
    pub fn post_event(&self, event: Event) {
        self.sink.post_event(event);
    }

    #[inline]
    pub fn handoff(&self) -> &HandoffStore {
        &self.handoff
    }
}

impl std::fmt::Debug for HostControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostControl")
            .field("handoff", &self.handoff)
            .finish_non_exhaustive()
    }
}

/// Resolves names to ids when setting up routing.
pub trait ProcessorContainer: Send + Sync {
    fn processor_id(&self, name: &str) -> Option<ObjectId>;

    fn parameter_id(&self, processor_id: ObjectId, parameter_name: &str) -> Option<ObjectId>;

    fn track_id(&self, name: &str) -> Option<ObjectId>;
}

/// Fields and helpers shared by all processors.
pub struct ProcessorBase {
    id: ObjectId,
    name: String,
    label: String,
    enabled: bool,
    bypassed: bool,

    max_input_channels: usize,
    max_output_channels: usize,
    current_input_channels: usize,
    current_output_channels: usize,

    parameters: Vec<ParameterDescriptor>,
    parameters_by_name: HashMap<String, usize>,

    output_pipe: Option<Box<dyn RtEventPipe>>,
    host_control: Option<HostControl>,

    cv_out_connections: SmallVec<[CvConnection; MAX_CV_OUTPUTS]>,
    gate_out_connections: SmallVec<[GateConnection; MAX_GATE_OUTPUTS]>,
}

impl ProcessorBase {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: ProcessorIdGenerator::new_id(),
            name: name.into(),
            label: label.into(),
            enabled: false,
            bypassed: false,
            max_input_channels: 0,
            max_output_channels: 0,
            current_input_channels: 0,
            current_output_channels: 0,
            parameters: Vec::new(),
            parameters_by_name: HashMap::new(),
            output_pipe: None,
            host_control: None,
            cv_out_connections: SmallVec::new(),
            gate_out_connections: SmallVec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn bypassed(&self) -> bool {
        self.bypassed
    }

    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    pub fn max_input_channels(&self) -> usize {
        self.max_input_channels
    }

    pub fn max_output_channels(&self) -> usize {
        self.max_output_channels
    }

    /// Declares how many channels the processor supports. Also resets the
    /// current channel counts to the maximum.
    pub fn set_max_channels(&mut self, inputs: usize, outputs: usize) {
        self.max_input_channels = inputs;
        self.max_output_channels = outputs;
        self.current_input_channels = inputs;
        self.current_output_channels = outputs;
    }

    #[inline]
    pub fn input_channels(&self) -> usize {
        self.current_input_channels
    }

    #[inline]
    pub fn output_channels(&self) -> usize {
        self.current_output_channels
    }

    pub fn set_input_channels(&mut self, channels: usize) {
        debug_assert!(channels <= self.max_input_channels);
        self.current_input_channels = channels.min(self.max_input_channels);
    }

    pub fn set_output_channels(&mut self, channels: usize) {
        debug_assert!(channels <= self.max_output_channels);
        self.current_output_channels = channels.min(self.max_output_channels);
    }

    pub fn host_control(&self) -> Option<&HostControl> {
        self.host_control.as_ref()
    }

    pub fn set_host_control(&mut self, host_control: HostControl) {
        self.host_control = Some(host_control);
    }

    // Parameters

    /// Registers `descriptor` with the next free index as its id. Returns
    /// `false` if the name or that id is already taken.
    pub fn register_parameter(&mut self, descriptor: ParameterDescriptor) -> bool {
        let id = self.parameters.len() as ObjectId;
        self.register_parameter_with_id(descriptor, id)
    }

    /// Registers with an explicit id, for plugin formats whose ids are not
    /// indices. Non-realtime only.
    pub fn register_parameter_with_id(&mut self, mut descriptor: ParameterDescriptor, id: ObjectId) -> bool {
        if self.parameters.iter().any(|p| p.id() == id)
            || self.parameters_by_name.contains_key(descriptor.name())
        {
            return false;
        }
        descriptor.set_id(id);
        self.parameters_by_name
            .insert(descriptor.name().to_string(), self.parameters.len());
        self.parameters.push(descriptor);
        true
    }

    pub fn parameter_from_name(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters_by_name
            .get(name)
            .and_then(|&index| self.parameters.get(index))
    }

    pub fn parameter_from_id(&self, id: ObjectId) -> Option<&ParameterDescriptor> {
        match self.parameters.get(id as usize) {
            Some(p) if p.id() == id => Some(p),
            _ => self.parameters.iter().find(|p| p.id() == id),
        }
    }

    pub fn all_parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// `name`, or `name_2`, `name_3`, ... if already taken.
    pub fn make_unique_parameter_name(&self, name: &str) -> String {
        let base = if name.is_empty() { "parameter" } else { name };
        let mut unique = base.to_string();
        let mut index = 1;
        while self.parameters_by_name.contains_key(&unique) {
            index += 1;
            unique = format!("{base}_{index}");
        }
        unique
    }

    // Realtime output

    pub fn set_event_output(&mut self, pipe: Box<dyn RtEventPipe>) {
        self.output_pipe = Some(pipe);
    }

    /// Sends an event out of the processor. Dropped if no output is set.
    #[inline]
    pub fn output_event(&mut self, event: RtEvent) {
        if let Some(pipe) = self.output_pipe.as_mut() {
            pipe.send_event(event);
        }
    }

    /// Routes changes of `parameter_id` to `cv_output_id`.
    pub fn connect_cv_from_parameter(&mut self, parameter_id: ObjectId, cv_output_id: u16) -> ProcessorResult<()> {
        if cv_output_id as usize >= MAX_CV_OUTPUTS || self.cv_out_connections.len() >= MAX_CV_OUTPUTS {
            return Err(ProcessorError::Error);
        }
        if self.parameter_from_id(parameter_id).is_none() {
            return Err(ProcessorError::ParameterNotFound);
        }
        self.cv_out_connections.push(CvConnection {
            processor_id: self.id,
            parameter_id,
            cv_id: cv_output_id,
        });
        Ok(())
    }

    /// Routes note on/off of `(channel, note)` to `gate_output_id`.
    pub fn connect_gate_from_processor(&mut self, gate_output_id: u16, channel: u8, note: u8) -> ProcessorResult<()> {
        debug_assert!((gate_output_id as usize) < MAX_GATE_OUTPUTS && note <= MAX_GATE_NOTE_NO);
        if self
            .gate_out_connections
            .iter()
            .any(|c| c.channel == channel && c.note == note)
        {
            return Err(ProcessorError::Error);
        }
        if self.gate_out_connections.len() >= MAX_GATE_OUTPUTS {
            return Err(ProcessorError::MemoryError);
        }
        self.gate_out_connections.push(GateConnection {
            processor_id: self.id,
            gate_id: gate_output_id,
            note,
            channel,
        });
        Ok(())
    }

    pub fn cv_connections(&self) -> &[CvConnection] {
        &self.cv_out_connections
    }

    pub fn gate_connections(&self) -> &[GateConnection] {
        &self.gate_out_connections
    }

    /// Emits a CV event if `parameter_id` is routed to a CV output. A routed
    /// parameter should not also be notified as a parameter change.
    pub fn maybe_output_cv_value(&mut self, parameter_id: ObjectId, value: f32) -> bool {
        let id = self.id;
        let Some(connection) = self
            .cv_out_connections
            .iter()
            .find(|c| c.parameter_id == parameter_id)
        else {
            return false;
        };
        let event = RtEvent::cv(id, 0, connection.cv_id, value);
        self.output_event(event);
        true
    }

    pub fn maybe_output_gate_event(&mut self, channel: u8, note: u8, note_on: bool) -> bool {
        let id = self.id;
        let Some(connection) = self
            .gate_out_connections
            .iter()
            .find(|c| c.channel == channel && c.note == note)
        else {
            return false;
        };
        let event = RtEvent::gate(id, 0, connection.gate_id, note_on);
        self.output_event(event);
        true
    }

    /// Copies input to output, wrapping input channels when there are fewer
    /// of them. Silence if there are no inputs.
    pub fn bypass_process(&self, input: &SampleBuffer, output: &mut SampleBuffer) {
        let inputs = self.current_input_channels;
        if inputs == 0 {
            output.clear();
            return;
        }
        for c in 0..self.current_output_channels {
            output.replace_channel(c, c % inputs, input);
        }
    }

    /// Decodes raw MIDI into keyboard events, gate-routed notes excepted.
    /// Messages without a keyboard counterpart are dropped.
    pub fn output_midi_event_as_internal(&mut self, data: MidiDataByte, sample_offset: i32) {
        let id = self.id;
        match midi::decode_message_type(data) {
            MessageType::NoteOn => {
                let Some(msg) = midi::decode_note_on(data) else { return };
                if !self.maybe_output_gate_event(msg.channel, msg.note, true) {
                    let velocity = msg.velocity as f32 / midi::MAX_VALUE as f32;
                    self.output_event(RtEvent::note_on(id, sample_offset, msg.channel, msg.note, velocity));
                }
            }
            MessageType::NoteOff => {
                let Some(msg) = midi::decode_note_off(data) else { return };
                if !self.maybe_output_gate_event(msg.channel, msg.note, false) {
                    let velocity = msg.velocity as f32 / midi::MAX_VALUE as f32;
                    self.output_event(RtEvent::note_off(id, sample_offset, msg.channel, msg.note, velocity));
                }
            }
            MessageType::PitchBend => {
                let Some(msg) = midi::decode_pitch_bend(data) else { return };
                let value = msg.value as f32 / midi::PITCH_BEND_MIDDLE as f32 - 1.0;
                self.output_event(RtEvent::pitch_bend(id, sample_offset, msg.channel, value));
            }
            MessageType::ControlChange => {
                let Some(msg) = midi::decode_control_change(data) else { return };
                if msg.controller == midi::MOD_WHEEL_CONTROLLER_NO {
                    let value = msg.value as f32 / midi::MAX_VALUE as f32;
                    self.output_event(RtEvent::modulation(id, sample_offset, msg.channel, value));
                }
            }
            MessageType::PolyKeyPressure => {
                let Some(msg) = midi::decode_poly_key_pressure(data) else { return };
                let value = msg.pressure as f32 / midi::MAX_VALUE as f32;
                self.output_event(RtEvent::note_aftertouch(id, sample_offset, msg.channel, msg.note, value));
            }
            MessageType::ChannelPressure => {
                let Some(msg) = midi::decode_channel_pressure(data) else { return };
                let value = msg.pressure as f32 / midi::MAX_VALUE as f32;
                self.output_event(RtEvent::aftertouch(id, sample_offset, msg.channel, value));
            }
            _ => {}
        }
    }

    /// Asks for `callback(data, event_id)` to run on a non-realtime thread.
    /// The result comes back as an `AsyncWorkNotification` event.
    pub fn request_non_rt_task(&mut self, callback: AsyncWorkCallback, data: u64) -> EventId {
        let event_id = EventIdGenerator::new_id();
        let event = RtEvent::async_work(self.id, 0, event_id, AsyncWork { callback, data });
        self.output_event(event);
        event_id
    }

    /// Hands a payload back for release off the audio thread.
    pub fn async_delete(&mut self, handle: HandoffId) {
        let event = RtEvent::delete(self.id, handle);
        self.output_event(event);
    }

    /// Tells the host that parameter values changed in bulk.
    pub fn notify_state_change_rt(&mut self) {
        let event = RtEvent::notify(self.id, 0, NotifyAction::ParameterUpdate);
        self.output_event(event);
    }
}

impl std::fmt::Debug for ProcessorBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorBase")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("bypassed", &self.bypassed)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

/// A node in the audio graph.
///
/// `process_event` and `process_audio` run on the audio thread and must not
/// block or allocate. Everything else is non-realtime.
pub trait Processor: Send {
    fn base(&self) -> &ProcessorBase;

    fn base_mut(&mut self) -> &mut ProcessorBase;

    /// One-time setup. Must succeed before any processing call.
    fn init(&mut self, _sample_rate: f32) -> ProcessorResult<()> {
        Ok(())
    }

    /// May be called again after `init`, also while enabled.
    fn configure(&mut self, _sample_rate: f32) {}

    fn process_event(&mut self, event: RtEvent);

    fn process_audio(&mut self, input: &SampleBuffer, output: &mut SampleBuffer);

    fn id(&self) -> ObjectId {
        self.base().id()
    }

    fn name(&self) -> &str {
        self.base().name()
    }

    fn label(&self) -> &str {
        self.base().label()
    }

    fn enabled(&self) -> bool {
        self.base().enabled()
    }

    /// A disabled processor is not processed and should drop any internal
    /// state, like filter memory or reverb tails.
    fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().set_enabled(enabled);
    }

    fn bypassed(&self) -> bool {
        self.base().bypassed()
    }

    fn set_bypassed(&mut self, bypassed: bool) {
        self.base_mut().set_bypassed(bypassed);
    }

    fn max_input_channels(&self) -> usize {
        self.base().max_input_channels()
    }

    fn max_output_channels(&self) -> usize {
        self.base().max_output_channels()
    }

    fn input_channels(&self) -> usize {
        self.base().input_channels()
    }

    fn output_channels(&self) -> usize {
        self.base().output_channels()
    }

    fn set_input_channels(&mut self, channels: usize) {
        self.base_mut().set_input_channels(channels);
    }

    fn set_output_channels(&mut self, channels: usize) {
        self.base_mut().set_output_channels(channels);
    }

    fn set_event_output(&mut self, pipe: Box<dyn RtEventPipe>) {
        self.base_mut().set_event_output(pipe);
    }

    fn parameter_count(&self) -> usize {
        self.base().parameter_count()
    }

    fn parameter_from_name(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.base().parameter_from_name(name)
    }

    fn parameter_from_id(&self, id: ObjectId) -> Option<&ParameterDescriptor> {
        self.base().parameter_from_id(id)
    }

    fn all_parameters(&self) -> &[ParameterDescriptor] {
        self.base().all_parameters()
    }

    /// Normalized value.
    fn parameter_value(&self, _parameter_id: ObjectId) -> ProcessorResult<f32> {
        Err(ProcessorError::ParameterNotFound)
    }

    fn parameter_value_in_domain(&self, _parameter_id: ObjectId) -> ProcessorResult<f32> {
        Err(ProcessorError::ParameterNotFound)
    }

    fn parameter_value_formatted(&self, _parameter_id: ObjectId) -> ProcessorResult<String> {
        Err(ProcessorError::ParameterNotFound)
    }

    fn property_value(&self, _property_id: ObjectId) -> ProcessorResult<String> {
        Err(ProcessorError::ParameterNotFound)
    }

    fn set_property_value(&self, _property_id: ObjectId, _value: &str) -> ProcessorResult<()> {
        Err(ProcessorError::UnsupportedOperation)
    }

    fn supports_programs(&self) -> bool {
        false
    }

    fn program_count(&self) -> usize {
        0
    }

    fn current_program(&self) -> usize {
        0
    }

    fn current_program_name(&self) -> String {
        String::new()
    }

    fn program_name(&self, _program: usize) -> ProcessorResult<String> {
        Err(ProcessorError::UnsupportedOperation)
    }

    fn all_program_names(&self) -> ProcessorResult<Vec<String>> {
        Err(ProcessorError::UnsupportedOperation)
    }

    fn set_program(&mut self, _program: usize) -> ProcessorResult<()> {
        Err(ProcessorError::UnsupportedOperation)
    }

    fn save_state(&self) -> ProcessorState {
        let mut state = ProcessorState::new();
        state.set_bypass(self.bypassed());
        state
    }

    /// With `realtime_running` the state is applied through the audio thread
    /// instead of written directly.
    fn set_state(&mut self, _state: &ProcessorState, _realtime_running: bool) -> ProcessorResult<()> {
        Err(ProcessorError::UnsupportedOperation)
    }

    fn connect_cv_from_parameter(&mut self, parameter_id: ObjectId, cv_output_id: u16) -> ProcessorResult<()> {
        self.base_mut().connect_cv_from_parameter(parameter_id, cv_output_id)
    }

    fn connect_gate_from_processor(&mut self, gate_output_id: u16, channel: u8, note: u8) -> ProcessorResult<()> {
        self.base_mut()
            .connect_gate_from_processor(gate_output_id, channel, note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RtEventKind;
    use crate::parameter::Direction;
    use crate::rt_fifo::{rt_event_fifo_with_capacity, RtEventConsumer};

    fn base_with_output() -> (ProcessorBase, RtEventConsumer) {
        let (tx, rx) = rt_event_fifo_with_capacity(64);
        let mut base = ProcessorBase::new("proc", "Processor");
        base.set_event_output(Box::new(tx));
        (base, rx)
    }

    fn float_param(name: &str) -> ParameterDescriptor {
        ParameterDescriptor::float(name, name, "", 0.0, 1.0, Direction::Automatable)
    }

    #[test]
    fn test_unique_ids() {
        let a = ProcessorBase::new("a", "A");
        let b = ProcessorBase::new("b", "B");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_register_assigns_index_ids() {
        let mut base = ProcessorBase::new("proc", "Processor");
        for name in ["gain", "pan", "mix"] {
            assert!(base.register_parameter(float_param(name)));
        }
        for (index, p) in base.all_parameters().iter().enumerate() {
            assert_eq!(p.id(), index as ObjectId);
            assert_eq!(base.parameter_from_id(p.id()).map(|d| d.name()), Some(p.name()));
        }
        assert_eq!(base.parameter_from_name("pan").map(|p| p.id()), Some(1));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut base = ProcessorBase::new("proc", "Processor");
        assert!(base.register_parameter(float_param("gain")));
        assert!(!base.register_parameter(float_param("gain")));
        assert_eq!(base.parameter_count(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut base = ProcessorBase::new("proc", "Processor");
        assert!(base.register_parameter_with_id(float_param("a"), 10));
        assert!(!base.register_parameter_with_id(float_param("b"), 10));
        assert_eq!(base.parameter_count(), 1);
        assert_eq!(base.parameter_from_id(10).map(|p| p.name()), Some("a"));
    }

    #[test]
    fn test_unique_parameter_names() {
        let mut base = ProcessorBase::new("proc", "Processor");
        assert_eq!(base.make_unique_parameter_name("gain"), "gain");
        base.register_parameter(float_param("gain"));
        assert_eq!(base.make_unique_parameter_name("gain"), "gain_2");
        base.register_parameter(float_param("gain_2"));
        assert_eq!(base.make_unique_parameter_name("gain"), "gain_3");
        assert_eq!(base.make_unique_parameter_name(""), "parameter");
    }

    #[test]
    fn test_channel_configuration() {
        let mut base = ProcessorBase::new("proc", "Processor");
        base.set_max_channels(2, 2);
        assert_eq!(base.input_channels(), 2);
        base.set_input_channels(1);
        assert_eq!(base.input_channels(), 1);
        assert_eq!(base.max_input_channels(), 2);
    }

    #[test]
    fn test_bypass_process_wraps_channels() {
        let mut base = ProcessorBase::new("proc", "Processor");
        base.set_max_channels(1, 2);
        let input = SampleBuffer::from_channels(&[&[0.5; 4]]);
        let mut output = SampleBuffer::new(2, 4);
        base.bypass_process(&input, &mut output);
        assert_eq!(output.channel(0), &[0.5; 4]);
        assert_eq!(output.channel(1), &[0.5; 4]);

        base.set_input_channels(0);
        base.bypass_process(&input, &mut output);
        assert_eq!(output.peak(), 0.0);
    }

    #[test]
    fn test_cv_output() {
        let (mut base, mut rx) = base_with_output();
        base.register_parameter(float_param("cutoff"));
        assert_eq!(
            base.connect_cv_from_parameter(5, 0),
            Err(ProcessorError::ParameterNotFound)
        );
        assert_eq!(
            base.connect_cv_from_parameter(0, MAX_CV_OUTPUTS as u16),
            Err(ProcessorError::Error)
        );
        base.connect_cv_from_parameter(0, 2).unwrap();

        assert!(base.maybe_output_cv_value(0, 0.3));
        assert!(!base.maybe_output_cv_value(1, 0.3));
        let event = rx.pop().unwrap();
        assert!(matches!(event.kind(), RtEventKind::Cv { cv_id: 2, .. }));
        assert!(rx.is_empty());
    }

    #[test]
    fn test_gate_routing_of_midi() {
        let (mut base, mut rx) = base_with_output();
        base.connect_gate_from_processor(1, 0, 60).unwrap();
        assert_eq!(
            base.connect_gate_from_processor(2, 0, 60),
            Err(ProcessorError::Error)
        );

        base.output_midi_event_as_internal([0x90, 60, 100, 0], 3);
        base.output_midi_event_as_internal([0x90, 61, 127, 0], 4);

        let gate = rx.pop().unwrap();
        assert!(matches!(gate.kind(), RtEventKind::Gate { gate_id: 1, value: true }));
        let note = rx.pop().unwrap();
        assert_eq!(note.sample_offset(), 4);
        match note.kind() {
            RtEventKind::NoteOn { note, velocity, .. } => {
                assert_eq!(*note, 61);
                assert_eq!(*velocity, 1.0);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_midi_as_internal_kinds() {
        let (mut base, mut rx) = base_with_output();
        base.output_midi_event_as_internal([0xE0, 0, 64, 0], 0);
        base.output_midi_event_as_internal([0xB0, 1, 127, 0], 0);
        base.output_midi_event_as_internal([0xB0, 7, 127, 0], 0);
        base.output_midi_event_as_internal([0xD2, 64, 0, 0], 0);
        base.output_midi_event_as_internal([0xF8, 0, 0, 0], 0);

        assert!(matches!(rx.pop().unwrap().kind(), RtEventKind::PitchBend { value, .. } if *value == 0.0));
        assert!(matches!(rx.pop().unwrap().kind(), RtEventKind::Modulation { value, .. } if *value == 1.0));
        assert!(matches!(rx.pop().unwrap().kind(), RtEventKind::Aftertouch { channel: 2, .. }));
        assert!(rx.is_empty());
    }

    fn work(data: u64, _id: EventId) -> i32 {
        data as i32
    }

    #[test]
    fn test_non_rt_requests() {
        let (mut base, mut rx) = base_with_output();
        let event_id = base.request_non_rt_task(work, 3);
        match rx.pop().unwrap().kind() {
            RtEventKind::AsyncWork { event_id: id, work } => {
                assert_eq!(*id, event_id);
                assert_eq!((work.callback)(work.data, *id), 3);
            }
            other => panic!("unexpected kind {other:?}"),
        }

        let store = HandoffStore::new(1);
        let handle = store
            .insert(crate::handoff::Handoff::String("x".into()))
            .unwrap();
        base.async_delete(handle);
        assert!(matches!(rx.pop().unwrap().kind(), RtEventKind::Delete(h) if *h == handle));

        base.notify_state_change_rt();
        assert!(matches!(
            rx.pop().unwrap().kind(),
            RtEventKind::Notify(NotifyAction::ParameterUpdate)
        ));
    }

    #[test]
    fn test_output_without_pipe_is_dropped() {
        let mut base = ProcessorBase::new("proc", "Processor");
        base.notify_state_change_rt();
    }
}
