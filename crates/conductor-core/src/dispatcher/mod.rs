//! Central event router between control threads and the audio thread.
//!
//! ```text
//!  post_event (any thread)         ┌──────────────────┐     RtEventFifo
//!  ────────────────────────────────▶ EventDispatcher  ├────────────────▶ audio thread
//!                                  │  (own thread)    │◀────────────────
//!  registered posters ◀────────────┤                  │     RtEventFifo
//!  keyboard / parameter / engine ◀─┤                  │
//!  listeners                       └───────┬──────────┘
//!                                          │ async work, deletes,
//!                                          ▼ lambdas, program changes
//!                                       Worker (own thread)
//! ```
//!
//! Events addressed to a poster go to that poster. Events with a realtime
//! form are converted and queued to the audio thread once their timestamp
//! falls inside the next audio chunk. Notifications fan out to listeners.
//! Every event's completion callback runs exactly once with the final status.
//!
//! # Example
//!
//! ```
//! use conductor_core::{
//!     EngineConfig, Event, EventDispatcher, EventSink, KeyboardEvent, KeyboardEventType,
//!     IMMEDIATE_PROCESS,
//! };
//!
//! let (dispatcher, mut to_audio, _from_audio) = EventDispatcher::with_rt_queues(&EngineConfig::default());
//! let note = KeyboardEvent::note(KeyboardEventType::NoteOn, 1, 0, 60, 1.0);
//! dispatcher.post_event(Event::keyboard(note, IMMEDIATE_PROCESS));
//! dispatcher.process_pending();
//! assert!(to_audio.pop().is_some());
//! ```

mod poster;
mod worker;

pub use poster::{EngineHandler, EventPoster, EventSink};

#[cfg(test)]
pub(crate) use poster::testing;

use crate::config::EngineConfig;
use crate::error::EventDispatcherError;
use crate::event::{Event, EventStatus, PosterId, RtEvent, RtEventKind, MAX_POSTERS};
use crate::event_timer::EventTimer;
use crate::handoff::{HandoffId, HandoffStore};
use crate::rt_fifo::{rt_event_fifo_with_capacity, RtEventConsumer, RtEventProducer};
use crate::types::Time;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use worker::Worker;

type Listeners = RwLock<Vec<Arc<dyn EventPoster>>>;

pub struct EventDispatcher {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    inbound_tx: Sender<Event>,
    inbound: Receiver<Event>,
    posters: RwLock<[Option<Arc<dyn EventPoster>>; MAX_POSTERS]>,
    keyboard_listeners: Listeners,
    parameter_listeners: Listeners,
    engine_listeners: Listeners,
    /// Events whose timestamp lies beyond the next audio chunk.
    waiting: Mutex<Vec<Event>>,
    to_rt: Mutex<RtEventProducer>,
    from_rt: Mutex<RtEventConsumer>,
    timer: EventTimer,
    handoff: Arc<HandoffStore>,
    worker: Worker,
    running: AtomicBool,
    period: Duration,
}

impl EventDispatcher {
    /// `to_rt` feeds the audio thread, `from_rt` carries its output events.
    pub fn new(config: &EngineConfig, to_rt: RtEventProducer, from_rt: RtEventConsumer) -> Self {
        let (inbound_tx, inbound) = unbounded();
        let handoff = Arc::new(HandoffStore::new(config.handoff_capacity));
        let worker = Worker::new(inbound_tx.clone(), Arc::clone(&handoff), config.worker_period);
        Self {
            shared: Arc::new(Shared {
                inbound_tx,
                inbound,
                posters: RwLock::new(std::array::from_fn(|_| None)),
                keyboard_listeners: RwLock::new(Vec::new()),
                parameter_listeners: RwLock::new(Vec::new()),
                engine_listeners: RwLock::new(Vec::new()),
                waiting: Mutex::new(Vec::new()),
                to_rt: Mutex::new(to_rt),
                from_rt: Mutex::new(from_rt),
                timer: EventTimer::new(config.sample_rate, config.audio_chunk_size),
                handoff,
                worker,
                running: AtomicBool::new(false),
                period: config.dispatcher_period,
            }),
            thread: Mutex::new(None),
        }
    }

    /// Creates the dispatcher together with the audio thread's ends of both
    /// queues: `(dispatcher, events for the audio thread, sender for its output)`.
    pub fn with_rt_queues(config: &EngineConfig) -> (Self, RtEventConsumer, RtEventProducer) {
        let (to_rt, audio_in) = rt_event_fifo_with_capacity(config.rt_queue_capacity);
        let (audio_out, from_rt) = rt_event_fifo_with_capacity(config.rt_queue_capacity);
        (Self::new(config, to_rt, from_rt), audio_in, audio_out)
    }

    /// Store backing payload handles in realtime events.
    pub fn handoff(&self) -> Arc<HandoffStore> {
        Arc::clone(&self.shared.handoff)
    }

    pub fn set_engine_handler(&self, engine: Arc<dyn EngineHandler>) {
        self.shared.worker.set_engine_handler(engine);
    }

    pub fn set_sample_rate(&self, sample_rate: f32) {
        self.shared.timer.set_sample_rate(sample_rate);
    }

    /// Called from the audio thread at the start of each chunk.
    pub fn set_time(&self, timestamp: Time) {
        self.shared.timer.set_incoming_time(timestamp);
        self.shared.timer.set_outgoing_time(timestamp);
    }

    pub fn register_poster(&self, poster: Arc<dyn EventPoster>) -> std::result::Result<(), EventDispatcherError> {
        let mut posters = self.shared.posters.write();
        let slot = &mut posters[poster.poster_id().index()];
        if slot.is_some() {
            return Err(EventDispatcherError::AlreadySubscribed);
        }
        *slot = Some(poster);
        Ok(())
    }

    pub fn deregister_poster(&self, poster_id: PosterId) -> std::result::Result<(), EventDispatcherError> {
        match self.shared.posters.write()[poster_id.index()].take() {
            Some(_) => Ok(()),
            None => Err(EventDispatcherError::UnknownPoster),
        }
    }

    pub fn subscribe_to_keyboard_events(
        &self,
        receiver: Arc<dyn EventPoster>,
    ) -> std::result::Result<(), EventDispatcherError> {
        subscribe(&self.shared.keyboard_listeners, receiver)
    }

    pub fn subscribe_to_parameter_change_notifications(
        &self,
        receiver: Arc<dyn EventPoster>,
    ) -> std::result::Result<(), EventDispatcherError> {
        subscribe(&self.shared.parameter_listeners, receiver)
    }

    pub fn subscribe_to_engine_notifications(
        &self,
        receiver: Arc<dyn EventPoster>,
    ) -> std::result::Result<(), EventDispatcherError> {
        subscribe(&self.shared.engine_listeners, receiver)
    }

    pub fn unsubscribe_from_keyboard_events(
        &self,
        poster_id: PosterId,
    ) -> std::result::Result<(), EventDispatcherError> {
        unsubscribe(&self.shared.keyboard_listeners, poster_id)
    }

    pub fn unsubscribe_from_parameter_change_notifications(
        &self,
        poster_id: PosterId,
    ) -> std::result::Result<(), EventDispatcherError> {
        unsubscribe(&self.shared.parameter_listeners, poster_id)
    }

    pub fn unsubscribe_from_engine_notifications(
        &self,
        poster_id: PosterId,
    ) -> std::result::Result<(), EventDispatcherError> {
        unsubscribe(&self.shared.engine_listeners, poster_id)
    }

    /// Runs one dispatch iteration on the calling thread: waiting events,
    /// then inbound events, then output from the audio thread.
    pub fn process_pending(&self) {
        self.shared.process_pending();
    }

    /// Runs queued worker jobs on the calling thread.
    pub fn process_worker_pending(&self) {
        self.shared.worker.process_pending();
    }

    /// Starts the dispatcher and worker threads. Calling it again while
    /// running does nothing.
    pub fn run(&self) -> Result<()> {
        let mut thread = self.thread.lock();
        if thread.is_some() {
            return Ok(());
        }
        self.shared.worker.run()?;
        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("conductor-dispatcher".to_string())
            .spawn(move || shared.event_loop())?;
        *thread = Some(handle);
        Ok(())
    }

    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.lock().take() {
            if handle.join().is_err() {
                tracing::error!("Dispatcher thread panicked");
            }
        }
        self.shared.worker.stop();
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }
}

impl EventSink for EventDispatcher {
    fn post_event(&self, event: Event) {
        if self.shared.inbound_tx.send(event).is_err() {
            tracing::warn!("Event dispatcher inbound queue closed, event dropped");
        }
    }
}

impl Drop for EventDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("running", &self.is_running())
            .field("waiting", &self.shared.waiting.lock().len())
            .finish()
    }
}

fn subscribe(listeners: &Listeners, receiver: Arc<dyn EventPoster>) -> std::result::Result<(), EventDispatcherError> {
    let mut listeners = listeners.write();
    if listeners.iter().any(|l| l.poster_id() == receiver.poster_id()) {
        return Err(EventDispatcherError::AlreadySubscribed);
    }
    listeners.push(receiver);
    Ok(())
}

fn unsubscribe(listeners: &Listeners, poster_id: PosterId) -> std::result::Result<(), EventDispatcherError> {
    let mut listeners = listeners.write();
    let before = listeners.len();
    listeners.retain(|l| l.poster_id() != poster_id);
    if listeners.len() == before {
        Err(EventDispatcherError::UnknownPoster)
    } else {
        Ok(())
    }
}

fn handoff_handle(event: &RtEvent) -> Option<HandoffId> {
    match *event.kind() {
        RtEventKind::StringPropertyChange { handle, .. }
        | RtEventKind::DataPropertyChange { handle, .. }
        | RtEventKind::SetState(handle) => Some(handle),
        _ => None,
    }
}

impl Shared {
    fn event_loop(&self) {
        tracing::debug!("Event dispatcher started");
        while self.running.load(Ordering::Acquire) {
            self.process_pending();
            match self.inbound.recv_timeout(self.period) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("Event dispatcher stopped");
    }

    fn process_pending(&self) {
        self.retry_waiting();
        while let Ok(event) = self.inbound.try_recv() {
            self.dispatch(event);
        }
        self.drain_rt_events();
    }

    fn dispatch(&self, event: Event) {
        if event.process_asynchronously() {
            self.worker.process(event);
            return;
        }
        let status = if let Some(receiver) = event.receiver() {
            let poster = self.posters.read()[receiver.index()].clone();
            match poster {
                Some(poster) => poster.process(&event),
                None => EventStatus::UnrecognizedReceiver,
            }
        } else if event.maps_to_rt_event() {
            match self.timer.sample_offset_from_realtime(event.time()) {
                Some(offset) => self.send_to_rt(&event, offset),
                None => {
                    self.waiting.lock().push(event);
                    return;
                }
            }
        } else if event.is_parameter_change_notification() {
            publish(&self.parameter_listeners, &event);
            EventStatus::HandledOk
        } else if event.is_engine_notification() {
            publish(&self.engine_listeners, &event);
            EventStatus::HandledOk
        } else {
            EventStatus::UnrecognizedEvent
        };
        event.complete(status);
    }

    fn retry_waiting(&self) {
        let waiting = std::mem::take(&mut *self.waiting.lock());
        for event in waiting {
            match self.timer.sample_offset_from_realtime(event.time()) {
                Some(offset) => {
                    let status = self.send_to_rt(&event, offset);
                    event.complete(status);
                }
                None => self.waiting.lock().push(event),
            }
        }
    }

    fn send_to_rt(&self, event: &Event, offset: usize) -> EventStatus {
        let Some(rt_event) = event.to_rt_event(offset as i32, &self.handoff) else {
            tracing::warn!("Hand-off store full, dropping event {}", event.id());
            return EventStatus::Error;
        };
        let handle = handoff_handle(&rt_event);
        if self.to_rt.lock().push(rt_event) {
            return EventStatus::HandledOk;
        }
        tracing::warn!("Queue to audio thread full, dropping event {}", event.id());
        if let Some(handle) = handle {
            self.handoff.release(handle);
        }
        EventStatus::Error
    }

    fn drain_rt_events(&self) {
        let mut from_rt = self.from_rt.lock();
        while let Some(rt_event) = from_rt.pop() {
            let offset = rt_event.sample_offset().max(0) as usize;
            let timestamp = self.timer.real_time_from_sample_offset(offset);
            let Some(event) = Event::from_rt_event(&rt_event, timestamp) else {
                continue;
            };
            if event.is_keyboard_event() {
                publish(&self.keyboard_listeners, &event);
            } else if event.is_parameter_change_event() {
                publish(&self.parameter_listeners, &event);
            } else if event.is_engine_notification() {
                publish(&self.engine_listeners, &event);
            } else if event.process_asynchronously() {
                self.worker.process(event);
            }
        }
        let dropped = from_rt.take_dropped();
        if dropped > 0 {
            tracing::warn!("{} events from the audio thread were dropped", dropped);
        }
    }
}

fn publish(listeners: &Listeners, event: &Event) {
    // Snapshot so listeners may (un)subscribe from their callback.
    let listeners = listeners.read().clone();
    for listener in &listeners {
        listener.process(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{
        AsyncWork, EventKind, KeyboardEvent, KeyboardEventType, Lambda, ParameterChange,
        ParameterChangeNotification, PropertyChangeNotification,
    };
    use crate::types::{EventId, IMMEDIATE_PROCESS};

    struct Recorder {
        id: PosterId,
        seen: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(id: PosterId) -> Arc<Self> {
            Arc::new(Self {
                id,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().clone()
        }
    }

    impl EventPoster for Recorder {
        fn process(&self, event: &Event) -> EventStatus {
            self.seen.lock().push(format!("{:?}", event.kind()));
            EventStatus::HandledOk
        }

        fn poster_id(&self) -> PosterId {
            self.id
        }
    }

    fn dispatcher() -> (EventDispatcher, RtEventConsumer, RtEventProducer) {
        EventDispatcher::with_rt_queues(&EngineConfig::default())
    }

    fn status_slot() -> (Arc<Mutex<Vec<EventStatus>>>, impl FnOnce(&Event, EventStatus) + Send + 'static) {
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let result = Arc::clone(&statuses);
        (statuses, move |_: &Event, s: EventStatus| result.lock().push(s))
    }

    #[test]
    fn test_register_poster_twice() {
        let (dispatcher, _, _) = dispatcher();
        let poster = Recorder::new(PosterId::Controller);
        assert!(dispatcher.register_poster(poster.clone()).is_ok());
        assert_eq!(
            dispatcher.register_poster(poster),
            Err(EventDispatcherError::AlreadySubscribed)
        );
        assert!(dispatcher.deregister_poster(PosterId::Controller).is_ok());
        assert_eq!(
            dispatcher.deregister_poster(PosterId::Controller),
            Err(EventDispatcherError::UnknownPoster)
        );
    }

    #[test]
    fn test_subscribe_twice() {
        let (dispatcher, _, _) = dispatcher();
        let listener = Recorder::new(PosterId::MidiDispatcher);
        assert!(dispatcher.subscribe_to_keyboard_events(listener.clone()).is_ok());
        assert_eq!(
            dispatcher.subscribe_to_keyboard_events(listener.clone()),
            Err(EventDispatcherError::AlreadySubscribed)
        );
        assert!(dispatcher.subscribe_to_engine_notifications(listener).is_ok());
        assert!(dispatcher.unsubscribe_from_keyboard_events(PosterId::MidiDispatcher).is_ok());
        assert_eq!(
            dispatcher.unsubscribe_from_keyboard_events(PosterId::MidiDispatcher),
            Err(EventDispatcherError::UnknownPoster)
        );
    }

    #[test]
    fn test_keyboard_event_reaches_audio_thread() {
        let (dispatcher, mut to_audio, _) = dispatcher();
        let (statuses, callback) = status_slot();
        let note = KeyboardEvent::note(KeyboardEventType::NoteOn, 4, 0, 60, 0.5);
        dispatcher.post_event(Event::keyboard(note, IMMEDIATE_PROCESS).with_completion(callback));
        dispatcher.process_pending();

        let rt_event = to_audio.pop().unwrap();
        assert_eq!(rt_event.processor_id(), 4);
        assert_eq!(rt_event.sample_offset(), 0);
        assert!(rt_event.is_keyboard_event());
        assert_eq!(*statuses.lock(), vec![EventStatus::HandledOk]);
    }

    #[test]
    fn test_future_event_waits_for_its_chunk() {
        let (dispatcher, mut to_audio, _) = dispatcher();
        let (statuses, callback) = status_slot();
        let event = Event::new(EventKind::SetEngineTempo(140.0), Duration::from_secs(1)).with_completion(callback);
        dispatcher.post_event(event);
        dispatcher.process_pending();
        assert!(to_audio.pop().is_none());
        assert!(statuses.lock().is_empty());

        dispatcher.set_time(Duration::from_secs(1));
        dispatcher.process_pending();
        assert!(matches!(to_audio.pop().unwrap().kind(), RtEventKind::Tempo(t) if *t == 140.0));
        assert_eq!(*statuses.lock(), vec![EventStatus::HandledOk]);
    }

    #[test]
    fn test_events_from_one_source_keep_posting_order() {
        let (dispatcher, mut to_audio, _) = dispatcher();
        dispatcher.post_event(Event::new(EventKind::SetEngineTempo(90.0), Duration::from_secs(5)));
        for i in 0..16 {
            let change = ParameterChange::float(7, 2, i as f32 / 16.0);
            dispatcher.post_event(Event::parameter_change(change, IMMEDIATE_PROCESS));
        }
        dispatcher.process_pending();

        let mut values = Vec::new();
        while let Some(event) = to_audio.pop() {
            match *event.kind() {
                RtEventKind::FloatParameterChange { parameter_id, value } => {
                    assert_eq!((event.processor_id(), parameter_id), (7, 2));
                    values.push(value);
                }
                ref other => panic!("unexpected event {other:?}"),
            }
        }
        let expected: Vec<f32> = (0..16).map(|i| i as f32 / 16.0).collect();
        assert_eq!(values, expected);

        // The tempo change is still parked for its chunk.
        dispatcher.set_time(Duration::from_secs(5));
        dispatcher.process_pending();
        assert!(matches!(to_audio.pop().unwrap().kind(), RtEventKind::Tempo(t) if *t == 90.0));
        assert!(to_audio.pop().is_none());
    }

    #[test]
    fn test_addressed_event_goes_to_poster() {
        let (dispatcher, _, _) = dispatcher();
        let poster = Recorder::new(PosterId::Controller);
        dispatcher.register_poster(poster.clone()).unwrap();

        let (statuses, callback) = status_slot();
        dispatcher.post_event(
            Event::immediate(EventKind::SetEngineTempo(90.0))
                .with_receiver(PosterId::Controller)
                .with_completion(callback),
        );
        let (missing, callback) = status_slot();
        dispatcher.post_event(
            Event::immediate(EventKind::SetEngineTempo(90.0))
                .with_receiver(PosterId::OscFrontend)
                .with_completion(callback),
        );
        dispatcher.process_pending();

        assert_eq!(poster.seen().len(), 1);
        assert_eq!(*statuses.lock(), vec![EventStatus::HandledOk]);
        assert_eq!(*missing.lock(), vec![EventStatus::UnrecognizedReceiver]);
    }

    #[test]
    fn test_notifications_fan_out() {
        let (dispatcher, _, _) = dispatcher();
        let first = Recorder::new(PosterId::Controller);
        let second = Recorder::new(PosterId::OscFrontend);
        dispatcher.subscribe_to_parameter_change_notifications(first.clone()).unwrap();
        dispatcher.subscribe_to_parameter_change_notifications(second.clone()).unwrap();

        dispatcher.post_event(Event::immediate(EventKind::ParameterChangeNotification(
            ParameterChangeNotification {
                processor_id: 1,
                parameter_id: 0,
                normalized_value: 0.5,
                domain_value: 0.5,
                formatted_value: "0.50".to_string(),
            },
        )));
        dispatcher.process_pending();
        assert_eq!(first.seen().len(), 1);
        assert_eq!(second.seen().len(), 1);
    }

    #[test]
    fn test_audio_output_is_published() {
        let (dispatcher, _, mut from_audio) = dispatcher();
        let keyboard = Recorder::new(PosterId::MidiDispatcher);
        let parameters = Recorder::new(PosterId::Controller);
        dispatcher.subscribe_to_keyboard_events(keyboard.clone()).unwrap();
        dispatcher.subscribe_to_parameter_change_notifications(parameters.clone()).unwrap();

        assert!(from_audio.push(RtEvent::note_off(2, 10, 0, 64, 0.0)));
        assert!(from_audio.push(RtEvent::parameter_change(2, 0, 1, 0.25)));
        dispatcher.process_pending();

        assert_eq!(keyboard.seen().len(), 1);
        assert!(keyboard.seen()[0].contains("NoteOff"));
        assert_eq!(parameters.seen().len(), 1);
        assert!(parameters.seen()[0].contains("ParameterChange"));
    }

    fn triple(data: u64, _id: EventId) -> i32 {
        data as i32 * 3
    }

    #[test]
    fn test_async_work_round_trip() {
        let (dispatcher, mut to_audio, mut from_audio) = dispatcher();
        from_audio.push(RtEvent::async_work(
            7,
            0,
            99,
            AsyncWork {
                callback: triple,
                data: 5,
            },
        ));
        dispatcher.process_pending();
        dispatcher.process_worker_pending();
        dispatcher.process_pending();

        let rt_event = to_audio.pop().unwrap();
        assert_eq!(rt_event.processor_id(), 7);
        assert!(matches!(
            rt_event.kind(),
            RtEventKind::AsyncWorkNotification { return_status: 15, .. }
        ));
    }

    #[test]
    fn test_property_change_fills_and_frees_handoff() {
        let (dispatcher, mut to_audio, mut from_audio) = dispatcher();
        let store = dispatcher.handoff();
        let capacity = store.capacity();
        dispatcher.post_event(Event::immediate(EventKind::StringPropertyChange {
            processor_id: 3,
            property_id: 1,
            value: "sample.wav".to_string(),
        }));
        dispatcher.process_pending();
        assert_eq!(store.available(), capacity - 1);

        let handle = match *to_audio.pop().unwrap().kind() {
            RtEventKind::StringPropertyChange { handle, .. } => handle,
            ref other => panic!("unexpected kind {other:?}"),
        };
        from_audio.push(RtEvent::delete(3, handle));
        dispatcher.process_pending();
        dispatcher.process_worker_pending();
        assert_eq!(store.available(), capacity);
    }

    #[test]
    fn test_full_queue_releases_payload() {
        let config = EngineConfig {
            rt_queue_capacity: 1,
            ..EngineConfig::default()
        };
        let (dispatcher, _to_audio, _) = EventDispatcher::with_rt_queues(&config);
        let store = dispatcher.handoff();
        let (statuses, callback) = status_slot();
        dispatcher.post_event(Event::immediate(EventKind::SetEngineTempo(100.0)));
        dispatcher.post_event(
            Event::immediate(EventKind::DataPropertyChange {
                processor_id: 1,
                property_id: 0,
                data: vec![0; 16],
            })
            .with_completion(callback),
        );
        dispatcher.process_pending();
        assert_eq!(*statuses.lock(), vec![EventStatus::Error]);
        assert_eq!(store.available(), store.capacity());
    }

    #[test]
    fn test_property_notification_completes() {
        let (dispatcher, _, _) = dispatcher();
        let (statuses, callback) = status_slot();
        dispatcher.post_event(
            Event::immediate(EventKind::PropertyChangeNotification(
                PropertyChangeNotification {
                    processor_id: 1,
                    property_id: 2,
                    value: "x".to_string(),
                },
            ))
            .with_completion(callback),
        );
        dispatcher.process_pending();
        // Property notifications travel with parameter notifications.
        assert_eq!(*statuses.lock(), vec![EventStatus::HandledOk]);
    }

    #[test]
    fn test_threads_deliver_lambda() {
        let (dispatcher, _, _) = dispatcher();
        dispatcher.run().unwrap();
        assert!(dispatcher.is_running());
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        dispatcher.post_event(Event::immediate(EventKind::Lambda(Lambda::new(move || {
            done_tx.send(()).ok();
            EventStatus::HandledOk
        }))));
        assert!(done_rx.recv_timeout(Duration::from_secs(2)).is_ok());
        dispatcher.stop();
        assert!(!dispatcher.is_running());
    }
}
