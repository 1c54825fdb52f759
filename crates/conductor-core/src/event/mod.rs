//! Event model: control events, realtime events and the conversions between them.

mod control;
mod rt;

pub use control::{
    AudioGraphAction, CompletionCallback, EngineNotification, Event, EventKind, EventStatus,
    KeyboardEvent, KeyboardEventType, Lambda, ParameterChange, ParameterChangeNotification,
    ParameterChangeType, PosterId, PropertyChangeNotification, MAX_POSTERS,
};
pub use rt::{AsyncWork, AsyncWorkCallback, ClipChannelType, NotifyAction, RtEvent, RtEventKind};
