//! Realtime events.
//!
//! A [`RtEvent`] is a plain `Copy` value that fits in one cache line. It never
//! owns memory: variable-size payloads travel as [`HandoffId`] handles into a
//! [`HandoffStore`](crate::HandoffStore) and are released off the audio thread
//! through a `Delete` event.

use crate::connection::{AudioConnection, CvConnection, GateConnection};
use crate::handoff::HandoffId;
use crate::types::{EventId, MidiDataByte, ObjectId, PlayingMode, SyncMode, Time, TimeSignature};

/// Non-realtime work requested from the audio thread. Receives the opaque
/// `data` word and the id of the requesting event, returns a status code that
/// is handed back to the processor in an `AsyncWorkNotification`.
pub type AsyncWorkCallback = fn(data: u64, event_id: EventId) -> i32;

#[derive(Debug, Clone, Copy)]
pub struct AsyncWork {
    pub callback: AsyncWorkCallback,
    pub data: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipChannelType {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    /// Parameter values changed in bulk, e.g. after a realtime state change.
    ParameterUpdate,
}

#[derive(Debug, Clone, Copy)]
pub enum RtEventKind {
    NoteOn {
        channel: u8,
        note: u8,
        velocity: f32,
    },
    NoteOff {
        channel: u8,
        note: u8,
        velocity: f32,
    },
    NoteAftertouch {
        channel: u8,
        note: u8,
        velocity: f32,
    },
    /// Value in `[-1, 1]`.
    PitchBend {
        channel: u8,
        value: f32,
    },
    Aftertouch {
        channel: u8,
        value: f32,
    },
    Modulation {
        channel: u8,
        value: f32,
    },
    WrappedMidi(MidiDataByte),
    Gate {
        gate_id: u16,
        value: bool,
    },
    Cv {
        cv_id: u16,
        value: f32,
    },
    FloatParameterChange {
        parameter_id: ObjectId,
        value: f32,
    },
    IntParameterChange {
        parameter_id: ObjectId,
        value: f32,
    },
    BoolParameterChange {
        parameter_id: ObjectId,
        value: f32,
    },
    DataPropertyChange {
        property_id: ObjectId,
        handle: HandoffId,
    },
    StringPropertyChange {
        property_id: ObjectId,
        handle: HandoffId,
    },
    SetBypass(bool),
    SetState(HandoffId),
    /// Payload finished on the audio thread; free it elsewhere.
    Delete(HandoffId),
    Notify(NotifyAction),
    Tempo(f32),
    TimeSignature(TimeSignature),
    PlayingMode(PlayingMode),
    SyncMode(SyncMode),
    InsertProcessor,
    RemoveProcessor,
    AddProcessorToTrack {
        track_id: ObjectId,
        before: Option<ObjectId>,
    },
    RemoveProcessorFromTrack {
        track_id: ObjectId,
    },
    AddTrack,
    RemoveTrack,
    AsyncWork {
        event_id: EventId,
        work: AsyncWork,
    },
    AsyncWorkNotification {
        event_id: EventId,
        return_status: i32,
    },
    AddAudioConnection(AudioConnection),
    RemoveAudioConnection(AudioConnection),
    AddCvConnection(CvConnection),
    RemoveCvConnection(CvConnection),
    AddGateConnection(GateConnection),
    RemoveGateConnection(GateConnection),
    Synchronisation(Time),
    TimingTick(i32),
    ClipNotification {
        channel: u8,
        channel_type: ClipChannelType,
    },
}

/// Fixed-size event consumed on, or produced by, the audio thread.
#[derive(Debug, Clone, Copy)]
pub struct RtEvent {
    processor_id: ObjectId,
    sample_offset: i32,
    kind: RtEventKind,
}

impl RtEvent {
    #[inline]
    pub fn new(processor_id: ObjectId, sample_offset: i32, kind: RtEventKind) -> Self {
        Self {
            processor_id,
            sample_offset,
            kind,
        }
    }

    #[inline]
    pub fn processor_id(&self) -> ObjectId {
        self.processor_id
    }

    #[inline]
    pub fn sample_offset(&self) -> i32 {
        self.sample_offset
    }

    #[inline]
    pub fn kind(&self) -> &RtEventKind {
        &self.kind
    }

    /// Used when forwarding an event to another processor.
    #[inline]
    pub fn retarget(mut self, processor_id: ObjectId) -> Self {
        self.processor_id = processor_id;
        self
    }

    pub fn is_keyboard_event(&self) -> bool {
        matches!(
            self.kind,
            RtEventKind::NoteOn { .. }
                | RtEventKind::NoteOff { .. }
                | RtEventKind::NoteAftertouch { .. }
                | RtEventKind::PitchBend { .. }
                | RtEventKind::Aftertouch { .. }
                | RtEventKind::Modulation { .. }
                | RtEventKind::WrappedMidi(_)
        )
    }

    pub fn is_parameter_change(&self) -> bool {
        matches!(
            self.kind,
            RtEventKind::FloatParameterChange { .. }
                | RtEventKind::IntParameterChange { .. }
                | RtEventKind::BoolParameterChange { .. }
        )
    }

    pub fn note_on(processor_id: ObjectId, offset: i32, channel: u8, note: u8, velocity: f32) -> Self {
        Self::new(
            processor_id,
            offset,
            RtEventKind::NoteOn {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn note_off(processor_id: ObjectId, offset: i32, channel: u8, note: u8, velocity: f32) -> Self {
        Self::new(
            processor_id,
            offset,
            RtEventKind::NoteOff {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn note_aftertouch(
        processor_id: ObjectId,
        offset: i32,
        channel: u8,
        note: u8,
        velocity: f32,
    ) -> Self {
        Self::new(
            processor_id,
            offset,
            RtEventKind::NoteAftertouch {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn pitch_bend(processor_id: ObjectId, offset: i32, channel: u8, value: f32) -> Self {
        Self::new(processor_id, offset, RtEventKind::PitchBend { channel, value })
    }

    pub fn aftertouch(processor_id: ObjectId, offset: i32, channel: u8, value: f32) -> Self {
        Self::new(processor_id, offset, RtEventKind::Aftertouch { channel, value })
    }

    pub fn modulation(processor_id: ObjectId, offset: i32, channel: u8, value: f32) -> Self {
        Self::new(processor_id, offset, RtEventKind::Modulation { channel, value })
    }

    pub fn wrapped_midi(processor_id: ObjectId, offset: i32, data: MidiDataByte) -> Self {
        Self::new(processor_id, offset, RtEventKind::WrappedMidi(data))
    }

    pub fn gate(processor_id: ObjectId, offset: i32, gate_id: u16, value: bool) -> Self {
        Self::new(processor_id, offset, RtEventKind::Gate { gate_id, value })
    }

    pub fn cv(processor_id: ObjectId, offset: i32, cv_id: u16, value: f32) -> Self {
        Self::new(processor_id, offset, RtEventKind::Cv { cv_id, value })
    }

    /// Float parameter change carrying a normalized value.
    pub fn parameter_change(
        processor_id: ObjectId,
        offset: i32,
        parameter_id: ObjectId,
        value: f32,
    ) -> Self {
        Self::new(
            processor_id,
            offset,
            RtEventKind::FloatParameterChange {
                parameter_id,
                value,
            },
        )
    }

    pub fn set_bypass(processor_id: ObjectId, offset: i32, bypassed: bool) -> Self {
        Self::new(processor_id, offset, RtEventKind::SetBypass(bypassed))
    }

    pub fn delete(processor_id: ObjectId, handle: HandoffId) -> Self {
        Self::new(processor_id, 0, RtEventKind::Delete(handle))
    }

    pub fn async_work(
        processor_id: ObjectId,
        offset: i32,
        event_id: EventId,
        work: AsyncWork,
    ) -> Self {
        Self::new(processor_id, offset, RtEventKind::AsyncWork { event_id, work })
    }

    pub fn notify(processor_id: ObjectId, offset: i32, action: NotifyAction) -> Self {
        Self::new(processor_id, offset, RtEventKind::Notify(action))
    }

    pub fn tempo(offset: i32, tempo: f32) -> Self {
        Self::new(0, offset, RtEventKind::Tempo(tempo))
    }

    pub fn timing_tick(offset: i32, tick_count: i32) -> Self {
        Self::new(0, offset, RtEventKind::TimingTick(tick_count))
    }

    pub fn clip_notification(offset: i32, channel: u8, channel_type: ClipChannelType) -> Self {
        Self::new(
            0,
            offset,
            RtEventKind::ClipNotification {
                channel,
                channel_type,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_data: u64, _id: EventId) -> i32 {
        0
    }

    #[test]
    fn test_fits_in_cache_line() {
        assert!(std::mem::size_of::<RtEvent>() <= 64);
    }

    #[test]
    fn test_keyboard_classification() {
        assert!(RtEvent::note_on(1, 0, 0, 60, 1.0).is_keyboard_event());
        assert!(RtEvent::wrapped_midi(1, 0, [0x90, 60, 100, 0]).is_keyboard_event());
        assert!(!RtEvent::parameter_change(1, 0, 2, 0.5).is_keyboard_event());
        assert!(RtEvent::parameter_change(1, 0, 2, 0.5).is_parameter_change());
    }

    #[test]
    fn test_retarget_keeps_payload() {
        let event = RtEvent::note_off(1, 12, 3, 64, 0.5).retarget(7);
        assert_eq!(event.processor_id(), 7);
        assert_eq!(event.sample_offset(), 12);
        assert!(matches!(
            event.kind(),
            RtEventKind::NoteOff {
                channel: 3,
                note: 64,
                ..
            }
        ));
    }

    #[test]
    fn test_async_work_event() {
        let work = AsyncWork {
            callback: noop,
            data: 42,
        };
        let event = RtEvent::async_work(3, 0, 99, work);
        match event.kind() {
            RtEventKind::AsyncWork { event_id, work } => {
                assert_eq!(*event_id, 99);
                assert_eq!((work.callback)(work.data, *event_id), 0);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
