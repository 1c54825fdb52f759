//! Identifiers, time and small value types shared by every subsystem.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Identifier of a processor, track or parameter.
pub type ObjectId = u32;

/// Identifier of a single control or realtime event.
pub type EventId = u32;

/// Engine time, measured from an arbitrary monotonic origin.
pub type Time = Duration;

/// Timestamp meaning "as soon as possible".
pub const IMMEDIATE_PROCESS: Time = Duration::ZERO;

/// Raw MIDI message, padded with zeros.
pub type MidiDataByte = [u8; 4];

/// Opaque binary payload, e.g. a plugin preset chunk.
pub type BlobData = Vec<u8>;

static NEXT_PROCESSOR_ID: AtomicU32 = AtomicU32::new(0);
static NEXT_EVENT_ID: AtomicU32 = AtomicU32::new(1);

/// Hands out unique processor ids. Ids are never reused.
pub struct ProcessorIdGenerator;

impl ProcessorIdGenerator {
    #[inline]
    pub fn new_id() -> ObjectId {
        NEXT_PROCESSOR_ID.fetch_add(1, Ordering::Relaxed)
    }
}

/// Hands out unique event ids. Zero is never returned.
pub struct EventIdGenerator;

impl EventIdGenerator {
    #[inline]
    pub fn new_id() -> EventId {
        NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: i32,
    pub denominator: i32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayingMode {
    #[default]
    Stopped,
    Playing,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncMode {
    #[default]
    Internal,
    Midi,
    Gate,
    Link,
}
