//! Control events.
//!
//! Control events live on non-realtime threads. They may own strings, blobs
//! and closures, are moved between threads by value, and are converted to and
//! from [`RtEvent`]s at the realtime boundary.

use super::rt::{AsyncWork, ClipChannelType, NotifyAction, RtEvent, RtEventKind};
use crate::handoff::{Handoff, HandoffId, HandoffStore};
use crate::state::RtState;
use crate::types::{
    BlobData, EventId, EventIdGenerator, MidiDataByte, ObjectId, PlayingMode, SyncMode, Time,
    TimeSignature, IMMEDIATE_PROCESS,
};

/// Outcome of handing an event to a receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    HandledOk,
    Error,
    NotHandled,
    /// The receiver kept the event and will finish it later.
    QueuedHandling,
    UnrecognizedReceiver,
    UnrecognizedEvent,
}

/// Components that can post events and be addressed as receivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosterId {
    AudioEngine,
    MidiDispatcher,
    Controller,
    OscFrontend,
    Worker,
}

pub const MAX_POSTERS: usize = 5;

impl PosterId {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Called exactly once with the final status of an event.
pub type CompletionCallback = Box<dyn FnOnce(&Event, EventStatus) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardEventType {
    NoteOn,
    NoteOff,
    NoteAftertouch,
    Aftertouch,
    PitchBend,
    Modulation,
    WrappedMidi,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardEvent {
    pub subtype: KeyboardEventType,
    pub processor_id: ObjectId,
    pub channel: u8,
    pub note: u8,
    /// Velocity for note events, value for channel-wide events.
    pub velocity: f32,
    pub midi_data: MidiDataByte,
}

impl KeyboardEvent {
    pub fn note(
        subtype: KeyboardEventType,
        processor_id: ObjectId,
        channel: u8,
        note: u8,
        velocity: f32,
    ) -> Self {
        Self {
            subtype,
            processor_id,
            channel,
            note,
            velocity,
            midi_data: [0; 4],
        }
    }

    /// Aftertouch, pitch bend or modulation.
    pub fn channel_value(
        subtype: KeyboardEventType,
        processor_id: ObjectId,
        channel: u8,
        value: f32,
    ) -> Self {
        Self::note(subtype, processor_id, channel, 0, value)
    }

    pub fn wrapped_midi(processor_id: ObjectId, midi_data: MidiDataByte) -> Self {
        Self {
            subtype: KeyboardEventType::WrappedMidi,
            processor_id,
            channel: 0,
            note: 0,
            velocity: 0.0,
            midi_data,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.velocity
    }

    fn to_rt_event(self, offset: i32) -> RtEvent {
        let id = self.processor_id;
        match self.subtype {
            KeyboardEventType::NoteOn => {
                RtEvent::note_on(id, offset, self.channel, self.note, self.velocity)
            }
            KeyboardEventType::NoteOff => {
                RtEvent::note_off(id, offset, self.channel, self.note, self.velocity)
            }
            KeyboardEventType::NoteAftertouch => {
                RtEvent::note_aftertouch(id, offset, self.channel, self.note, self.velocity)
            }
            KeyboardEventType::Aftertouch => {
                RtEvent::aftertouch(id, offset, self.channel, self.velocity)
            }
            KeyboardEventType::PitchBend => {
                RtEvent::pitch_bend(id, offset, self.channel, self.velocity)
            }
            KeyboardEventType::Modulation => {
                RtEvent::modulation(id, offset, self.channel, self.velocity)
            }
            KeyboardEventType::WrappedMidi => RtEvent::wrapped_midi(id, offset, self.midi_data),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterChangeType {
    Bool,
    Int,
    Float,
}

/// A request to change a parameter, or an echo of a change made on the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterChange {
    pub subtype: ParameterChangeType,
    pub processor_id: ObjectId,
    pub parameter_id: ObjectId,
    /// Normalized to `[0, 1]` unless a MIDI connection mapped it to its own range.
    pub value: f32,
}

impl ParameterChange {
    pub fn float(processor_id: ObjectId, parameter_id: ObjectId, value: f32) -> Self {
        Self {
            subtype: ParameterChangeType::Float,
            processor_id,
            parameter_id,
            value,
        }
    }

    #[inline]
    pub fn int_value(&self) -> i32 {
        self.value as i32
    }

    #[inline]
    pub fn bool_value(&self) -> bool {
        self.value > 0.5
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterChangeNotification {
    pub processor_id: ObjectId,
    pub parameter_id: ObjectId,
    pub normalized_value: f32,
    pub domain_value: f32,
    pub formatted_value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChangeNotification {
    pub processor_id: ObjectId,
    pub property_id: ObjectId,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioGraphAction {
    ProcessorCreated,
    ProcessorDeleted,
    ProcessorAddedToTrack,
    ProcessorRemovedFromTrack,
    ProcessorUpdated,
    TrackCreated,
    TrackDeleted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineNotification {
    Clipping {
        channel: u8,
        channel_type: ClipChannelType,
    },
    AudioGraph {
        action: AudioGraphAction,
        processor_id: ObjectId,
        track_id: ObjectId,
    },
    Tempo(f32),
    TimeSignature(TimeSignature),
    PlayingMode(PlayingMode),
    SyncMode(SyncMode),
    TimingTick(i32),
}

/// Engine work executed on the worker thread. Runs at most once.
pub struct Lambda(Option<Box<dyn FnOnce() -> EventStatus + Send>>);

impl Lambda {
    pub fn new(work: impl FnOnce() -> EventStatus + Send + 'static) -> Self {
        Self(Some(Box::new(work)))
    }

    /// Runs the work. A second call returns `EventStatus::Error`.
    pub fn execute(&mut self) -> EventStatus {
        match self.0.take() {
            Some(work) => work(),
            None => EventStatus::Error,
        }
    }
}

impl std::fmt::Debug for Lambda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Lambda")
    }
}

#[derive(Debug)]
pub enum EventKind {
    Keyboard(KeyboardEvent),
    ParameterChange(ParameterChange),
    StringPropertyChange {
        processor_id: ObjectId,
        property_id: ObjectId,
        value: String,
    },
    DataPropertyChange {
        processor_id: ObjectId,
        property_id: ObjectId,
        data: BlobData,
    },
    RtStateChange {
        processor_id: ObjectId,
        state: RtState,
    },
    SetProcessorBypass {
        processor_id: ObjectId,
        bypassed: bool,
    },
    ProgramChange {
        processor_id: ObjectId,
        program: i32,
    },
    SetEngineTempo(f32),
    SetEngineTimeSignature(TimeSignature),
    SetEnginePlayingMode(PlayingMode),
    SetEngineSyncMode(SyncMode),
    AsyncProcessorWork {
        processor_id: ObjectId,
        rt_event_id: EventId,
        work: AsyncWork,
    },
    AsyncWorkCompletion {
        processor_id: ObjectId,
        rt_event_id: EventId,
        return_status: i32,
    },
    /// Releases a hand-off slot once the audio thread is done with it.
    Delete(HandoffId),
    Lambda(Lambda),
    ParameterChangeNotification(ParameterChangeNotification),
    PropertyChangeNotification(PropertyChangeNotification),
    EngineNotification(EngineNotification),
}

pub struct Event {
    id: EventId,
    timestamp: Time,
    receiver: Option<PosterId>,
    kind: EventKind,
    completion: Option<CompletionCallback>,
}

impl Event {
    pub fn new(kind: EventKind, timestamp: Time) -> Self {
        Self {
            id: EventIdGenerator::new_id(),
            timestamp,
            receiver: None,
            kind,
            completion: None,
        }
    }

    pub fn immediate(kind: EventKind) -> Self {
        Self::new(kind, IMMEDIATE_PROCESS)
    }

    pub fn keyboard(event: KeyboardEvent, timestamp: Time) -> Self {
        Self::new(EventKind::Keyboard(event), timestamp)
    }

    pub fn parameter_change(change: ParameterChange, timestamp: Time) -> Self {
        Self::new(EventKind::ParameterChange(change), timestamp)
    }

    pub fn engine_notification(notification: EngineNotification, timestamp: Time) -> Self {
        Self::new(EventKind::EngineNotification(notification), timestamp)
    }

    /// Delivers the event straight to a registered poster instead of the
    /// dispatcher's own handling.
    pub fn with_receiver(mut self, receiver: PosterId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_completion(mut self, callback: impl FnOnce(&Event, EventStatus) + Send + 'static) -> Self {
        self.completion = Some(Box::new(callback));
        self
    }

    #[inline]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[inline]
    pub fn time(&self) -> Time {
        self.timestamp
    }

    #[inline]
    pub fn receiver(&self) -> Option<PosterId> {
        self.receiver
    }

    #[inline]
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn into_kind(self) -> EventKind {
        self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut EventKind {
        &mut self.kind
    }

    pub(crate) fn take_completion(&mut self) -> Option<CompletionCallback> {
        self.completion.take()
    }

    /// Runs the completion callback, if any, and consumes the event.
    pub fn complete(mut self, status: EventStatus) {
        if let Some(callback) = self.take_completion() {
            callback(&self, status);
        }
    }

    pub fn is_keyboard_event(&self) -> bool {
        matches!(self.kind, EventKind::Keyboard(_))
    }

    pub fn is_parameter_change_event(&self) -> bool {
        matches!(self.kind, EventKind::ParameterChange(_))
    }

    pub fn is_parameter_change_notification(&self) -> bool {
        matches!(
            self.kind,
            EventKind::ParameterChangeNotification(_) | EventKind::PropertyChangeNotification(_)
        )
    }

    pub fn is_engine_notification(&self) -> bool {
        matches!(self.kind, EventKind::EngineNotification(_))
    }

    /// Events executed on the worker thread rather than the dispatcher thread.
    pub fn process_asynchronously(&self) -> bool {
        matches!(
            self.kind,
            EventKind::AsyncProcessorWork { .. }
                | EventKind::Delete(_)
                | EventKind::Lambda(_)
                | EventKind::ProgramChange { .. }
        )
    }

    pub fn maps_to_rt_event(&self) -> bool {
        matches!(
            self.kind,
            EventKind::Keyboard(_)
                | EventKind::ParameterChange(_)
                | EventKind::StringPropertyChange { .. }
                | EventKind::DataPropertyChange { .. }
                | EventKind::RtStateChange { .. }
                | EventKind::SetProcessorBypass { .. }
                | EventKind::SetEngineTempo(_)
                | EventKind::SetEngineTimeSignature(_)
                | EventKind::SetEnginePlayingMode(_)
                | EventKind::SetEngineSyncMode(_)
                | EventKind::AsyncWorkCompletion { .. }
        )
    }

    /// Converts to a realtime event. Owned payloads are parked in `handoff`;
    /// returns `None` if the event has no realtime form or the store is full.
    pub fn to_rt_event(&self, sample_offset: i32, handoff: &HandoffStore) -> Option<RtEvent> {
        let offset = sample_offset;
        let event = match &self.kind {
            EventKind::Keyboard(kb) => kb.to_rt_event(offset),
            EventKind::ParameterChange(change) => {
                let parameter_id = change.parameter_id;
                let value = change.value;
                let kind = match change.subtype {
                    ParameterChangeType::Bool => RtEventKind::BoolParameterChange {
                        parameter_id,
                        value,
                    },
                    ParameterChangeType::Int => RtEventKind::IntParameterChange {
                        parameter_id,
                        value,
                    },
                    ParameterChangeType::Float => RtEventKind::FloatParameterChange {
                        parameter_id,
                        value,
                    },
                };
                RtEvent::new(change.processor_id, offset, kind)
            }
            EventKind::StringPropertyChange {
                processor_id,
                property_id,
                value,
            } => {
                let handle = handoff.insert(Handoff::String(value.clone()))?;
                RtEvent::new(
                    *processor_id,
                    offset,
                    RtEventKind::StringPropertyChange {
                        property_id: *property_id,
                        handle,
                    },
                )
            }
            EventKind::DataPropertyChange {
                processor_id,
                property_id,
                data,
            } => {
                let handle = handoff.insert(Handoff::Blob(data.clone()))?;
                RtEvent::new(
                    *processor_id,
                    offset,
                    RtEventKind::DataPropertyChange {
                        property_id: *property_id,
                        handle,
                    },
                )
            }
            EventKind::RtStateChange {
                processor_id,
                state,
            } => {
                let handle = handoff.insert(Handoff::State(state.clone()))?;
                RtEvent::new(*processor_id, offset, RtEventKind::SetState(handle))
            }
            EventKind::SetProcessorBypass {
                processor_id,
                bypassed,
            } => RtEvent::set_bypass(*processor_id, offset, *bypassed),
            EventKind::SetEngineTempo(tempo) => RtEvent::tempo(offset, *tempo),
            EventKind::SetEngineTimeSignature(signature) => {
                RtEvent::new(0, offset, RtEventKind::TimeSignature(*signature))
            }
            EventKind::SetEnginePlayingMode(mode) => {
                RtEvent::new(0, offset, RtEventKind::PlayingMode(*mode))
            }
            EventKind::SetEngineSyncMode(mode) => {
                RtEvent::new(0, offset, RtEventKind::SyncMode(*mode))
            }
            EventKind::AsyncWorkCompletion {
                processor_id,
                rt_event_id,
                return_status,
            } => RtEvent::new(
                *processor_id,
                offset,
                RtEventKind::AsyncWorkNotification {
                    event_id: *rt_event_id,
                    return_status: *return_status,
                },
            ),
            _ => return None,
        };
        Some(event)
    }

    /// Converts output from the audio thread. Returns `None` for realtime
    /// events that have no control-domain counterpart.
    pub fn from_rt_event(rt_event: &RtEvent, timestamp: Time) -> Option<Event> {
        let id = rt_event.processor_id();
        let kind = match *rt_event.kind() {
            RtEventKind::NoteOn {
                channel,
                note,
                velocity,
            } => EventKind::Keyboard(KeyboardEvent::note(
                KeyboardEventType::NoteOn,
                id,
                channel,
                note,
                velocity,
            )),
            RtEventKind::NoteOff {
                channel,
                note,
                velocity,
            } => EventKind::Keyboard(KeyboardEvent::note(
                KeyboardEventType::NoteOff,
                id,
                channel,
                note,
                velocity,
            )),
            RtEventKind::NoteAftertouch {
                channel,
                note,
                velocity,
            } => EventKind::Keyboard(KeyboardEvent::note(
                KeyboardEventType::NoteAftertouch,
                id,
                channel,
                note,
                velocity,
            )),
            RtEventKind::PitchBend { channel, value } => EventKind::Keyboard(
                KeyboardEvent::channel_value(KeyboardEventType::PitchBend, id, channel, value),
            ),
            RtEventKind::Aftertouch { channel, value } => EventKind::Keyboard(
                KeyboardEvent::channel_value(KeyboardEventType::Aftertouch, id, channel, value),
            ),
            RtEventKind::Modulation { channel, value } => EventKind::Keyboard(
                KeyboardEvent::channel_value(KeyboardEventType::Modulation, id, channel, value),
            ),
            RtEventKind::WrappedMidi(data) => {
                EventKind::Keyboard(KeyboardEvent::wrapped_midi(id, data))
            }
            RtEventKind::FloatParameterChange {
                parameter_id,
                value,
            } => EventKind::ParameterChange(ParameterChange {
                subtype: ParameterChangeType::Float,
                processor_id: id,
                parameter_id,
                value,
            }),
            RtEventKind::IntParameterChange {
                parameter_id,
                value,
            } => EventKind::ParameterChange(ParameterChange {
                subtype: ParameterChangeType::Int,
                processor_id: id,
                parameter_id,
                value,
            }),
            RtEventKind::BoolParameterChange {
                parameter_id,
                value,
            } => EventKind::ParameterChange(ParameterChange {
                subtype: ParameterChangeType::Bool,
                processor_id: id,
                parameter_id,
                value,
            }),
            RtEventKind::Tempo(tempo) => {
                EventKind::EngineNotification(EngineNotification::Tempo(tempo))
            }
            RtEventKind::TimeSignature(signature) => {
                EventKind::EngineNotification(EngineNotification::TimeSignature(signature))
            }
            RtEventKind::PlayingMode(mode) => {
                EventKind::EngineNotification(EngineNotification::PlayingMode(mode))
            }
            RtEventKind::SyncMode(mode) => {
                EventKind::EngineNotification(EngineNotification::SyncMode(mode))
            }
            RtEventKind::AsyncWork { event_id, work } => EventKind::AsyncProcessorWork {
                processor_id: id,
                rt_event_id: event_id,
                work,
            },
            RtEventKind::Delete(handle) => EventKind::Delete(handle),
            RtEventKind::ClipNotification {
                channel,
                channel_type,
            } => EventKind::EngineNotification(EngineNotification::Clipping {
                channel,
                channel_type,
            }),
            RtEventKind::Notify(NotifyAction::ParameterUpdate) => {
                EventKind::EngineNotification(EngineNotification::AudioGraph {
                    action: AudioGraphAction::ProcessorUpdated,
                    processor_id: id,
                    track_id: 0,
                })
            }
            RtEventKind::TimingTick(tick) => {
                EventKind::EngineNotification(EngineNotification::TimingTick(tick))
            }
            _ => return None,
        };
        Some(Event::new(kind, timestamp))
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("id", &self.id)
            .field("timestamp", &self.timestamp)
            .field("receiver", &self.receiver)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ProcessorState;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn work(_data: u64, _id: EventId) -> i32 {
        7
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::immediate(EventKind::SetEngineTempo(120.0));
        let b = Event::immediate(EventKind::SetEngineTempo(120.0));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.time(), IMMEDIATE_PROCESS);
    }

    #[test]
    fn test_keyboard_to_rt() {
        let store = HandoffStore::new(1);
        let event = Event::keyboard(
            KeyboardEvent::note(KeyboardEventType::NoteOn, 5, 2, 48, 0.75),
            IMMEDIATE_PROCESS,
        );
        assert!(event.maps_to_rt_event());
        let rt = event.to_rt_event(10, &store).unwrap();
        assert_eq!(rt.processor_id(), 5);
        assert_eq!(rt.sample_offset(), 10);
        match rt.kind() {
            RtEventKind::NoteOn {
                channel,
                note,
                velocity,
            } => {
                assert_eq!((*channel, *note), (2, 48));
                assert_eq!(*velocity, 0.75);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_parameter_change_subtypes() {
        let store = HandoffStore::new(1);
        let change = ParameterChange {
            subtype: ParameterChangeType::Bool,
            processor_id: 1,
            parameter_id: 3,
            value: 0.7,
        };
        assert!(change.bool_value());
        assert_eq!(
            ParameterChange {
                subtype: ParameterChangeType::Int,
                value: 4.9,
                ..change
            }
            .int_value(),
            4
        );

        let rt = Event::parameter_change(change, IMMEDIATE_PROCESS)
            .to_rt_event(0, &store)
            .unwrap();
        assert!(matches!(
            rt.kind(),
            RtEventKind::BoolParameterChange {
                parameter_id: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_string_property_uses_handoff() {
        let store = HandoffStore::new(1);
        let event = Event::immediate(EventKind::StringPropertyChange {
            processor_id: 2,
            property_id: 1,
            value: "patch.json".to_string(),
        });
        let rt = event.to_rt_event(0, &store).unwrap();
        let handle = match rt.kind() {
            RtEventKind::StringPropertyChange { handle, .. } => *handle,
            other => panic!("unexpected kind {other:?}"),
        };
        let value = store.with(handle, |p| p.clone()).unwrap();
        assert_eq!(value, Handoff::String("patch.json".to_string()));

        // Store exhausted: the second conversion fails instead of blocking
        assert!(event.to_rt_event(0, &store).is_none());
    }

    #[test]
    fn test_state_change_uses_handoff() {
        let store = HandoffStore::new(1);
        let mut state = ProcessorState::new();
        state.set_bypass(true);
        let event = Event::immediate(EventKind::RtStateChange {
            processor_id: 9,
            state: RtState::from(&state),
        });
        let rt = event.to_rt_event(0, &store).unwrap();
        assert!(matches!(rt.kind(), RtEventKind::SetState(_)));
        assert_eq!(store.available(), 0);
    }

    #[test]
    fn test_async_events_do_not_map_to_rt() {
        let event = Event::immediate(EventKind::Lambda(Lambda::new(|| EventStatus::HandledOk)));
        assert!(event.process_asynchronously());
        assert!(!event.maps_to_rt_event());
        assert!(event.to_rt_event(0, &HandoffStore::new(1)).is_none());
    }

    #[test]
    fn test_from_rt_keyboard_and_parameter() {
        let rt = RtEvent::pitch_bend(4, 0, 1, -0.5);
        let event = Event::from_rt_event(&rt, IMMEDIATE_PROCESS).unwrap();
        assert!(event.is_keyboard_event());
        match event.kind() {
            EventKind::Keyboard(kb) => {
                assert_eq!(kb.subtype, KeyboardEventType::PitchBend);
                assert_eq!(kb.value(), -0.5);
            }
            other => panic!("unexpected kind {other:?}"),
        }

        let rt = RtEvent::parameter_change(4, 0, 2, 0.25);
        let event = Event::from_rt_event(&rt, IMMEDIATE_PROCESS).unwrap();
        assert!(event.is_parameter_change_event());
    }

    #[test]
    fn test_from_rt_async_work_and_notify() {
        let rt = RtEvent::async_work(
            3,
            0,
            11,
            AsyncWork {
                callback: work,
                data: 0,
            },
        );
        let event = Event::from_rt_event(&rt, IMMEDIATE_PROCESS).unwrap();
        assert!(event.process_asynchronously());

        let rt = RtEvent::notify(3, 0, NotifyAction::ParameterUpdate);
        let event = Event::from_rt_event(&rt, IMMEDIATE_PROCESS).unwrap();
        assert!(matches!(
            event.kind(),
            EventKind::EngineNotification(EngineNotification::AudioGraph {
                action: AudioGraphAction::ProcessorUpdated,
                processor_id: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_from_rt_without_counterpart() {
        let rt = RtEvent::gate(1, 0, 0, true);
        assert!(Event::from_rt_event(&rt, IMMEDIATE_PROCESS).is_none());
    }

    #[test]
    fn test_lambda_runs_once() {
        let mut lambda = Lambda::new(|| EventStatus::HandledOk);
        assert_eq!(lambda.execute(), EventStatus::HandledOk);
        assert_eq!(lambda.execute(), EventStatus::Error);
    }

    #[test]
    fn test_completion_runs_once() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let event = Event::immediate(EventKind::SetEngineTempo(90.0)).with_completion(
            move |_event, status| {
                assert_eq!(status, EventStatus::HandledOk);
                flag.store(true, Ordering::SeqCst);
            },
        );
        event.complete(EventStatus::HandledOk);
        assert!(called.load(Ordering::SeqCst));
    }
}
