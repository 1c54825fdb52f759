//! MIDI routing between hardware ports and the event dispatcher.
//!
//! ```text
//!  MidiFrontend ──send_midi(port, bytes)──▶ MidiDispatcher ──post_event──▶ EventDispatcher
//!                                          │  cc routes   [port][cc][ch]
//!                                          │  pc routes   [port][ch]
//!                                          │  kb routes   [port][ch]
//!                                          │  raw routes  [port][ch]
//!  MidiFrontend ◀──send_midi(out, bytes)── │  out routes  [track] ◀──process(keyboard event)
//! ```
//!
//! Every input lookup checks both the OMNI bucket and the bucket of the
//! message's channel, and both fire. Routes are only ever changed from
//! control threads; lookups on the ingress path take the same locks.

use crate::connection::{
    CcInputConnection, InputConnection, KbInputConnection, KbOutputConnection, OutputConnection,
    PcInputConnection,
};
use crate::error::{MidiDispatcherError, Result};
use conductor_core::midi::{self, MessageType, MAX_CONTROLLER_NO, MAX_VALUE, OMNI};
use conductor_core::{
    AudioGraphAction, EngineConfig, EngineNotification, Event, EventDispatcher,
    EventDispatcherError, EventKind, EventPoster, EventSink, EventStatus, KeyboardEvent,
    KeyboardEventType, MidiDataByte, ObjectId, ParameterChange, PlayingMode, PosterId,
    ProcessorContainer, Time,
};
use parking_lot::{Mutex, RwLock};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Velocity given to note offs decoded from note ons with velocity 0.
const NOTE_OFF_FROM_NOTE_ON_VELOCITY: f32 = 0.5;

/// Hardware or virtual MIDI ports on the other side of the dispatcher.
pub trait MidiFrontend: Send + Sync {
    fn send_midi(&self, output: usize, data: MidiDataByte, timestamp: Time);
}

type ChannelRoutes = BTreeMap<(usize, u8), Vec<InputConnection>>;
type OutputRoutes = SmallVec<[OutputConnection; 4]>;

pub struct MidiDispatcher {
    events: Arc<dyn EventSink>,
    container: Arc<dyn ProcessorContainer>,
    frontend: RwLock<Option<Arc<dyn MidiFrontend>>>,
    midi_inputs: usize,
    midi_outputs: usize,
    /// Keyed by `(port, cc, channel)`.
    cc_routes: Mutex<BTreeMap<(usize, u8, u8), Vec<InputConnection>>>,
    pc_routes: Mutex<ChannelRoutes>,
    kb_routes_in: Mutex<ChannelRoutes>,
    raw_routes_in: Mutex<ChannelRoutes>,
    kb_routes_out: Mutex<BTreeMap<ObjectId, OutputRoutes>>,
    clock_outputs: Mutex<Vec<bool>>,
}

impl MidiDispatcher {
    /// `events` receives every event decoded from MIDI input; `container`
    /// resolves processor, parameter and track names when connecting.
    pub fn new(
        config: &EngineConfig,
        events: Arc<dyn EventSink>,
        container: Arc<dyn ProcessorContainer>,
    ) -> Self {
        Self {
            events,
            container,
            frontend: RwLock::new(None),
            midi_inputs: config.midi_inputs,
            midi_outputs: config.midi_outputs,
            cc_routes: Mutex::new(BTreeMap::new()),
            pc_routes: Mutex::new(BTreeMap::new()),
            kb_routes_in: Mutex::new(BTreeMap::new()),
            raw_routes_in: Mutex::new(BTreeMap::new()),
            kb_routes_out: Mutex::new(BTreeMap::new()),
            clock_outputs: Mutex::new(vec![false; config.midi_outputs]),
        }
    }

    /// Registers with `dispatcher` as the MIDI poster and subscribes to
    /// keyboard events and engine notifications.
    pub fn attach(self: &Arc<Self>, dispatcher: &EventDispatcher) -> std::result::Result<(), EventDispatcherError> {
        dispatcher.register_poster(self.clone())?;
        dispatcher.subscribe_to_keyboard_events(self.clone())?;
        dispatcher.subscribe_to_engine_notifications(self.clone())?;
        Ok(())
    }

    /// Undoes [`attach`](Self::attach). Breaks the reference cycle between
    /// the two dispatchers.
    pub fn detach(&self, dispatcher: &EventDispatcher) {
        if let Err(e) = dispatcher.unsubscribe_from_keyboard_events(PosterId::MidiDispatcher) {
            tracing::debug!("MIDI dispatcher keyboard unsubscribe: {}", e);
        }
        if let Err(e) = dispatcher.unsubscribe_from_engine_notifications(PosterId::MidiDispatcher) {
            tracing::debug!("MIDI dispatcher engine unsubscribe: {}", e);
        }
        if let Err(e) = dispatcher.deregister_poster(PosterId::MidiDispatcher) {
            tracing::debug!("MIDI dispatcher deregister: {}", e);
        }
    }

    pub fn set_frontend(&self, frontend: Arc<dyn MidiFrontend>) {
        *self.frontend.write() = Some(frontend);
    }

    #[inline]
    pub fn midi_inputs(&self) -> usize {
        self.midi_inputs
    }

    #[inline]
    pub fn midi_outputs(&self) -> usize {
        self.midi_outputs
    }

    fn check_input(&self, input: usize, channel: u8) -> Result<()> {
        if input >= self.midi_inputs || channel > OMNI {
            return Err(MidiDispatcherError::InvalidMidiInput);
        }
        Ok(())
    }

    fn check_output(&self, output: usize, channel: u8) -> Result<()> {
        if channel >= OMNI {
            return Err(MidiDispatcherError::InvalidChannel);
        }
        if output >= self.midi_outputs {
            return Err(MidiDispatcherError::InvalidMidiOutput);
        }
        Ok(())
    }

    fn processor_id(&self, name: &str) -> Result<ObjectId> {
        self.container
            .processor_id(name)
            .ok_or(MidiDispatcherError::InvalidProcessor)
    }

    fn track_id(&self, name: &str) -> Result<ObjectId> {
        self.container
            .track_id(name)
            .ok_or(MidiDispatcherError::InvalidTrack)
    }

    /// Routes control change `cc_no` on `input` to a parameter, mapped to
    /// `[min_range, max_range]`. `channel` may be [`OMNI`].
    #[allow(clippy::too_many_arguments)]
    pub fn connect_cc_to_parameter(
        &self,
        input: usize,
        processor_name: &str,
        parameter_name: &str,
        cc_no: u8,
        min_range: f32,
        max_range: f32,
        relative: bool,
        channel: u8,
    ) -> Result<()> {
        self.check_input(input, channel)?;
        if cc_no > MAX_CONTROLLER_NO {
            return Err(MidiDispatcherError::InvalidParameter);
        }
        let processor_id = self.processor_id(processor_name)?;
        let parameter_id = self
            .container
            .parameter_id(processor_id, parameter_name)
            .ok_or(MidiDispatcherError::InvalidParameter)?;

        let connection =
            InputConnection::to_parameter(processor_id, parameter_id, min_range, max_range, relative);
        self.cc_routes
            .lock()
            .entry((input, cc_no, channel))
            .or_default()
            .push(connection);
        tracing::info!(
            "Connected cc {} on port {} channel {} to parameter {} of processor {}",
            cc_no,
            input,
            channel,
            parameter_id,
            processor_id
        );
        Ok(())
    }

    /// Removes every connection from `cc_no` on `input` and `channel` to the
    /// named processor. Other buckets are untouched.
    pub fn disconnect_cc_from_parameter(
        &self,
        input: usize,
        processor_name: &str,
        cc_no: u8,
        channel: u8,
    ) -> Result<()> {
        self.check_input(input, channel)?;
        let processor_id = self.processor_id(processor_name)?;
        if let Some(bucket) = self.cc_routes.lock().get_mut(&(input, cc_no, channel)) {
            bucket.retain(|c| c.target != processor_id);
        }
        tracing::info!(
            "Disconnected cc {} on port {} channel {} from processor {}",
            cc_no,
            input,
            channel,
            processor_id
        );
        Ok(())
    }

    pub fn disconnect_all_cc_from_processor(&self, processor_id: ObjectId) {
        for bucket in self.cc_routes.lock().values_mut() {
            bucket.retain(|c| c.target != processor_id);
        }
        tracing::debug!("Disconnected all cc's from processor {}", processor_id);
    }

    pub fn all_cc_input_connections(&self) -> Vec<CcInputConnection> {
        self.cc_input_connections(None)
    }

    pub fn cc_input_connections_for_processor(&self, processor_id: ObjectId) -> Vec<CcInputConnection> {
        self.cc_input_connections(Some(processor_id))
    }

    fn cc_input_connections(&self, processor_id: Option<ObjectId>) -> Vec<CcInputConnection> {
        let routes = self.cc_routes.lock();
        let mut connections = Vec::new();
        for (&(port, cc, channel), bucket) in routes.iter() {
            for connection in bucket {
                if processor_id.map_or(true, |id| id == connection.target) {
                    connections.push(CcInputConnection {
                        input_connection: *connection,
                        port,
                        channel,
                        cc,
                    });
                }
            }
        }
        connections
    }

    /// Routes program changes on `input` to a processor.
    pub fn connect_pc_to_processor(&self, input: usize, processor_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let processor_id = self.processor_id(processor_name)?;
        connect(&self.pc_routes, input, channel, processor_id);
        tracing::info!(
            "Connected program changes from port {} channel {} to processor {}",
            input,
            channel,
            processor_id
        );
        Ok(())
    }

    pub fn disconnect_pc_from_processor(&self, input: usize, processor_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let processor_id = self.processor_id(processor_name)?;
        disconnect(&self.pc_routes, input, channel, processor_id);
        tracing::info!(
            "Disconnected program changes from port {} channel {} to processor {}",
            input,
            channel,
            processor_id
        );
        Ok(())
    }

    pub fn disconnect_all_pc_from_processor(&self, processor_id: ObjectId) {
        disconnect_everywhere(&self.pc_routes, processor_id);
        tracing::debug!("Disconnected all pc's from processor {}", processor_id);
    }

    pub fn all_pc_input_connections(&self) -> Vec<PcInputConnection> {
        self.pc_input_connections(None)
    }

    pub fn pc_input_connections_for_processor(&self, processor_id: ObjectId) -> Vec<PcInputConnection> {
        self.pc_input_connections(Some(processor_id))
    }

    fn pc_input_connections(&self, processor_id: Option<ObjectId>) -> Vec<PcInputConnection> {
        let routes = self.pc_routes.lock();
        routes
            .iter()
            .flat_map(|(&(port, channel), bucket)| {
                bucket.iter().map(move |c| PcInputConnection {
                    processor_id: c.target,
                    port,
                    channel,
                })
            })
            .filter(|c| processor_id.map_or(true, |id| id == c.processor_id))
            .collect()
    }

    /// Routes decoded keyboard messages (notes, pitch bend, aftertouch and
    /// modulation) on `input` to a track.
    pub fn connect_kb_to_track(&self, input: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let track_id = self.track_id(track_name)?;
        connect(&self.kb_routes_in, input, channel, track_id);
        tracing::info!("Connected port {} channel {} to track {}", input, channel, track_id);
        Ok(())
    }

    pub fn disconnect_kb_from_track(&self, input: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let track_id = self.track_id(track_name)?;
        disconnect(&self.kb_routes_in, input, channel, track_id);
        tracing::info!("Disconnected port {} channel {} from track {}", input, channel, track_id);
        Ok(())
    }

    /// Routes undecoded MIDI on `input` to a track. Independent of the
    /// keyboard routes; a message can match both.
    pub fn connect_raw_midi_to_track(&self, input: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let track_id = self.track_id(track_name)?;
        connect(&self.raw_routes_in, input, channel, track_id);
        tracing::info!("Connected raw MIDI from port {} channel {} to track {}", input, channel, track_id);
        Ok(())
    }

    pub fn disconnect_raw_midi_from_track(&self, input: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_input(input, channel)?;
        let track_id = self.track_id(track_name)?;
        disconnect(&self.raw_routes_in, input, channel, track_id);
        tracing::info!("Disconnected raw MIDI from port {} channel {} to track {}", input, channel, track_id);
        Ok(())
    }

    /// Keyboard and raw connections, raw ones flagged with `raw_midi`.
    pub fn all_kb_input_connections(&self) -> Vec<KbInputConnection> {
        let mut connections = kb_input_connections(&self.kb_routes_in, false);
        connections.extend(kb_input_connections(&self.raw_routes_in, true));
        connections
    }

    /// Sends keyboard events of a track to `output` on `channel`. Unlike
    /// inputs, outputs need a concrete channel: [`OMNI`] is rejected with
    /// `InvalidChannel`.
    pub fn connect_track_to_output(&self, output: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_output(output, channel)?;
        let track_id = self.track_id(track_name)?;
        self.kb_routes_out
            .lock()
            .entry(track_id)
            .or_default()
            .push(OutputConnection { output, channel });
        tracing::info!("Connected track {} to output {} channel {}", track_id, output, channel);
        Ok(())
    }

    pub fn disconnect_track_from_output(&self, output: usize, track_name: &str, channel: u8) -> Result<()> {
        self.check_output(output, channel)?;
        let track_id = self.track_id(track_name)?;
        if let Some(outputs) = self.kb_routes_out.lock().get_mut(&track_id) {
            outputs.retain(|c| !(c.output == output && c.channel == channel));
        }
        tracing::info!("Disconnected track {} from output {} channel {}", track_id, output, channel);
        Ok(())
    }

    pub fn all_kb_output_connections(&self) -> Vec<KbOutputConnection> {
        let routes = self.kb_routes_out.lock();
        routes
            .iter()
            .flat_map(|(&track_id, outputs)| {
                outputs.iter().map(move |c| KbOutputConnection {
                    track_id,
                    port: c.output,
                    channel: c.channel,
                })
            })
            .collect()
    }

    /// Sends MIDI clock, start and stop on `output` following the transport.
    pub fn enable_midi_clock(&self, enabled: bool, output: usize) -> Result<()> {
        match self.clock_outputs.lock().get_mut(output) {
            Some(flag) => {
                *flag = enabled;
                Ok(())
            }
            None => {
                tracing::error!(
                    "Failed to {} midi clock for port {}, no such port",
                    if enabled { "enable" } else { "disable" },
                    output
                );
                Err(MidiDispatcherError::InvalidMidiOutput)
            }
        }
    }

    pub fn midi_clock_enabled(&self, output: usize) -> bool {
        self.clock_outputs.lock().get(output).copied().unwrap_or(false)
    }

    /// Ingress from a MIDI frontend. Decodes `data` and posts one event per
    /// matching connection.
    pub fn send_midi(&self, input: usize, data: &[u8], timestamp: Time) {
        let data = midi::to_midi_data_byte(data);
        let channel = midi::decode_channel(data);

        for_each_target(&self.raw_routes_in, input, channel, |c| {
            self.post(Event::keyboard(KeyboardEvent::wrapped_midi(c.target, data), timestamp));
        });

        match midi::decode_message_type(data) {
            MessageType::ControlChange => {
                let Some(msg) = midi::decode_control_change(data) else { return };
                {
                    let mut routes = self.cc_routes.lock();
                    for bucket in [OMNI, msg.channel] {
                        if let Some(connections) = routes.get_mut(&(input, msg.controller, bucket)) {
                            for c in connections.iter_mut() {
                                let abs = c.absolute_value(msg.value);
                                let value = c.map_value(abs);
                                let change = ParameterChange::float(c.target, c.parameter, value);
                                self.post(Event::parameter_change(change, timestamp));
                            }
                        }
                    }
                }
                if msg.controller == midi::MOD_WHEEL_CONTROLLER_NO {
                    let value = msg.value as f32 / MAX_VALUE as f32;
                    self.post_keyboard(input, msg.channel, timestamp, |target| {
                        KeyboardEvent::channel_value(KeyboardEventType::Modulation, target, msg.channel, value)
                    });
                }
            }
            MessageType::NoteOn => {
                let Some(msg) = midi::decode_note_on(data) else { return };
                let (subtype, velocity) = if msg.velocity == 0 {
                    (KeyboardEventType::NoteOff, NOTE_OFF_FROM_NOTE_ON_VELOCITY)
                } else {
                    (KeyboardEventType::NoteOn, msg.velocity as f32 / MAX_VALUE as f32)
                };
                self.post_keyboard(input, msg.channel, timestamp, |target| {
                    KeyboardEvent::note(subtype, target, msg.channel, msg.note, velocity)
                });
            }
            MessageType::NoteOff => {
                let Some(msg) = midi::decode_note_off(data) else { return };
                let velocity = msg.velocity as f32 / MAX_VALUE as f32;
                self.post_keyboard(input, msg.channel, timestamp, |target| {
                    KeyboardEvent::note(KeyboardEventType::NoteOff, target, msg.channel, msg.note, velocity)
                });
            }
            MessageType::PitchBend => {
                let Some(msg) = midi::decode_pitch_bend(data) else { return };
                let value = msg.value as f32 / midi::PITCH_BEND_MIDDLE as f32 - 1.0;
                self.post_keyboard(input, msg.channel, timestamp, |target| {
                    KeyboardEvent::channel_value(KeyboardEventType::PitchBend, target, msg.channel, value)
                });
            }
            MessageType::PolyKeyPressure => {
                let Some(msg) = midi::decode_poly_key_pressure(data) else { return };
                let pressure = msg.pressure as f32 / MAX_VALUE as f32;
                self.post_keyboard(input, msg.channel, timestamp, |target| {
                    KeyboardEvent::note(KeyboardEventType::NoteAftertouch, target, msg.channel, msg.note, pressure)
                });
            }
            MessageType::ChannelPressure => {
                let Some(msg) = midi::decode_channel_pressure(data) else { return };
                let pressure = msg.pressure as f32 / MAX_VALUE as f32;
                self.post_keyboard(input, msg.channel, timestamp, |target| {
                    KeyboardEvent::channel_value(KeyboardEventType::Aftertouch, target, msg.channel, pressure)
                });
            }
            MessageType::ProgramChange => {
                let Some(msg) = midi::decode_program_change(data) else { return };
                for_each_target(&self.pc_routes, input, msg.channel, |c| {
                    self.post(Event::new(
                        EventKind::ProgramChange {
                            processor_id: c.target,
                            program: msg.program as i32,
                        },
                        timestamp,
                    ));
                });
            }
            _ => {}
        }
    }

    fn post(&self, event: Event) {
        self.events.post_event(event);
    }

    fn post_keyboard(
        &self,
        input: usize,
        channel: u8,
        timestamp: Time,
        make: impl Fn(ObjectId) -> KeyboardEvent,
    ) {
        for_each_target(&self.kb_routes_in, input, channel, |c| {
            self.post(Event::keyboard(make(c.target), timestamp));
        });
    }

    fn send_to_frontend(&self, output: usize, data: MidiDataByte, timestamp: Time) {
        tracing::debug!(
            "Dispatching midi [{:x} {:x} {:x} {:x}] to output {}",
            data[0],
            data[1],
            data[2],
            data[3],
            output
        );
        if let Some(frontend) = self.frontend.read().as_ref() {
            frontend.send_midi(output, data, timestamp);
        }
    }

    fn send_keyboard_output(&self, event: &KeyboardEvent, timestamp: Time) {
        let outputs = match self.kb_routes_out.lock().get(&event.processor_id) {
            Some(outputs) => outputs.clone(),
            None => return,
        };
        for c in &outputs {
            let data = match event.subtype {
                KeyboardEventType::NoteOn => midi::encode_note_on(c.channel, event.note, event.velocity),
                KeyboardEventType::NoteOff => midi::encode_note_off(c.channel, event.note, event.velocity),
                KeyboardEventType::NoteAftertouch => {
                    midi::encode_poly_key_pressure(c.channel, event.note, event.velocity)
                }
                KeyboardEventType::Aftertouch => midi::encode_channel_pressure(c.channel, event.value()),
                KeyboardEventType::PitchBend => midi::encode_pitch_bend(c.channel, event.value()),
                KeyboardEventType::Modulation => {
                    midi::encode_control_change(c.channel, midi::MOD_WHEEL_CONTROLLER_NO, event.value())
                }
                KeyboardEventType::WrappedMidi => event.midi_data,
            };
            self.send_to_frontend(c.output, data, timestamp);
        }
    }

    fn handle_engine_notification(&self, notification: &EngineNotification, timestamp: Time) {
        match *notification {
            EngineNotification::AudioGraph {
                action: AudioGraphAction::ProcessorDeleted,
                processor_id,
                ..
            } => {
                self.disconnect_all_cc_from_processor(processor_id);
                self.disconnect_all_pc_from_processor(processor_id);
            }
            EngineNotification::AudioGraph {
                action: AudioGraphAction::TrackDeleted,
                track_id,
                ..
            } => {
                self.disconnect_all_cc_from_processor(track_id);
                self.disconnect_all_pc_from_processor(track_id);
                disconnect_everywhere(&self.kb_routes_in, track_id);
                disconnect_everywhere(&self.raw_routes_in, track_id);
                self.kb_routes_out.lock().remove(&track_id);
                tracing::debug!("Removed all MIDI routes of deleted track {}", track_id);
            }
            EngineNotification::PlayingMode(PlayingMode::Playing) => {
                self.send_clock_message(midi::encode_start_message(), timestamp);
            }
            EngineNotification::PlayingMode(PlayingMode::Stopped) => {
                self.send_clock_message(midi::encode_stop_message(), timestamp);
            }
            EngineNotification::TimingTick(_) => {
                self.send_clock_message(midi::encode_timing_clock(), timestamp);
            }
            _ => {}
        }
    }

    fn send_clock_message(&self, data: MidiDataByte, timestamp: Time) {
        let enabled: SmallVec<[usize; 8]> = self
            .clock_outputs
            .lock()
            .iter()
            .enumerate()
            .filter_map(|(output, &on)| on.then_some(output))
            .collect();
        for output in enabled {
            self.send_to_frontend(output, data, timestamp);
        }
    }
}

impl EventPoster for MidiDispatcher {
    /// Egress: encodes keyboard events for every output connection of their
    /// track. Engine notifications update routes and drive MIDI clock.
    fn process(&self, event: &Event) -> EventStatus {
        match event.kind() {
            EventKind::Keyboard(keyboard) => {
                self.send_keyboard_output(keyboard, event.time());
                EventStatus::HandledOk
            }
            EventKind::EngineNotification(notification) => {
                self.handle_engine_notification(notification, event.time());
                EventStatus::NotHandled
            }
            _ => EventStatus::NotHandled,
        }
    }

    fn poster_id(&self) -> PosterId {
        PosterId::MidiDispatcher
    }
}

impl std::fmt::Debug for MidiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidiDispatcher")
            .field("midi_inputs", &self.midi_inputs)
            .field("midi_outputs", &self.midi_outputs)
            .finish_non_exhaustive()
    }
}

fn connect(routes: &Mutex<ChannelRoutes>, input: usize, channel: u8, target: ObjectId) {
    routes
        .lock()
        .entry((input, channel))
        .or_default()
        .push(InputConnection::to_target(target));
}

fn disconnect(routes: &Mutex<ChannelRoutes>, input: usize, channel: u8, target: ObjectId) {
    if let Some(bucket) = routes.lock().get_mut(&(input, channel)) {
        bucket.retain(|c| c.target != target);
    }
}

fn disconnect_everywhere(routes: &Mutex<ChannelRoutes>, target: ObjectId) {
    for bucket in routes.lock().values_mut() {
        bucket.retain(|c| c.target != target);
    }
}

/// Calls `f` for the OMNI bucket and then the `channel` bucket of `input`.
fn for_each_target(routes: &Mutex<ChannelRoutes>, input: usize, channel: u8, mut f: impl FnMut(&InputConnection)) {
    let routes = routes.lock();
    for bucket in [OMNI, channel] {
        if let Some(connections) = routes.get(&(input, bucket)) {
            connections.iter().for_each(&mut f);
        }
    }
}

fn kb_input_connections(routes: &Mutex<ChannelRoutes>, raw_midi: bool) -> Vec<KbInputConnection> {
    let routes = routes.lock();
    routes
        .iter()
        .flat_map(|(&(port, channel), bucket)| {
            bucket.iter().map(move |c| KbInputConnection {
                input_connection: *c,
                port,
                channel,
                raw_midi,
            })
        })
        .collect()
}
