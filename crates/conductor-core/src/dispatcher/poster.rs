//! Seams between the dispatcher and the components around it.

use crate::event::{Event, EventStatus, PosterId};
use crate::types::ObjectId;

/// A component that receives events addressed to it and can subscribe to
/// notifications.
pub trait EventPoster: Send + Sync {
    /// Handles one event. Called on the dispatcher thread.
    fn process(&self, event: &Event) -> EventStatus;

    fn poster_id(&self) -> PosterId;
}

/// Anything that accepts control events. Thread safe and non-blocking.
pub trait EventSink: Send + Sync {
    fn post_event(&self, event: Event);
}

/// Engine-side handling of work executed on the worker thread.
pub trait EngineHandler: Send + Sync {
    fn set_program(&self, processor_id: ObjectId, program: i32) -> EventStatus;
}
