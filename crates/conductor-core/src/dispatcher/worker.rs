//! Thread for event work that may take long: async processor work, hand-off
//! releases, program changes and engine lambdas.

use super::poster::EngineHandler;
use crate::event::{Event, EventKind, EventStatus};
use crate::handoff::HandoffStore;
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(crate) struct Worker {
    queue: Sender<Event>,
    shared: Arc<WorkerShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

struct WorkerShared {
    queue: Receiver<Event>,
    /// Inbound queue of the dispatcher, for completion events.
    dispatcher: Sender<Event>,
    handoff: Arc<HandoffStore>,
    engine: RwLock<Option<Arc<dyn EngineHandler>>>,
    running: AtomicBool,
    period: Duration,
}

impl Worker {
    pub(crate) fn new(dispatcher: Sender<Event>, handoff: Arc<HandoffStore>, period: Duration) -> Self {
        let (queue, receiver) = unbounded();
        Self {
            queue,
            shared: Arc::new(WorkerShared {
                queue: receiver,
                dispatcher,
                handoff,
                engine: RwLock::new(None),
                running: AtomicBool::new(false),
                period,
            }),
            thread: Mutex::new(None),
        }
    }

    pub(crate) fn set_engine_handler(&self, engine: Arc<dyn EngineHandler>) {
        *self.shared.engine.write() = Some(engine);
    }

    /// Queues `event`. Its completion callback fires once the work is done.
    pub(crate) fn process(&self, event: Event) -> EventStatus {
        match self.queue.send(event) {
            Ok(()) => EventStatus::QueuedHandling,
            Err(_) => EventStatus::Error,
        }
    }

    /// Runs everything queued so far on the calling thread.
    pub(crate) fn process_pending(&self) {
        self.shared.process_pending();
    }

    pub(crate) fn run(&self) -> Result<()> {
        let mut thread = self.thread.lock();
        if thread.is_some() {
            return Ok(());
        }
        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("conductor-worker".to_string())
            .spawn(move || shared.worker_loop())?;
        *thread = Some(handle);
        Ok(())
    }

    pub(crate) fn stop(&self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.lock().take() {
            if handle.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }
    }
}

impl WorkerShared {
    fn worker_loop(&self) {
        tracing::debug!("Worker started");
        while self.running.load(Ordering::Acquire) {
            match self.queue.recv_timeout(self.period) {
                Ok(event) => {
                    self.execute(event);
                    self.process_pending();
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        tracing::debug!("Worker stopped");
    }

    fn process_pending(&self) {
        while let Ok(event) = self.queue.try_recv() {
            self.execute(event);
        }
    }

    fn execute(&self, mut event: Event) {
        let status = match event.kind_mut() {
            EventKind::AsyncProcessorWork {
                processor_id,
                rt_event_id,
                work,
            } => {
                let return_status = (work.callback)(work.data, *rt_event_id);
                let completion = Event::immediate(EventKind::AsyncWorkCompletion {
                    processor_id: *processor_id,
                    rt_event_id: *rt_event_id,
                    return_status,
                });
                if self.dispatcher.send(completion).is_err() {
                    tracing::warn!("Dispatcher gone, async work result of processor {} lost", processor_id);
                }
                EventStatus::HandledOk
            }
            EventKind::Delete(handle) => {
                if self.handoff.release(*handle).is_some() {
                    EventStatus::HandledOk
                } else {
                    tracing::warn!("Hand-off slot {} released twice", handle.index());
                    EventStatus::Error
                }
            }
            EventKind::Lambda(lambda) => lambda.execute(),
            EventKind::ProgramChange {
                processor_id,
                program,
            } => match self.engine.read().as_ref() {
                Some(engine) => engine.set_program(*processor_id, *program),
                None => EventStatus::NotHandled,
            },
            _ => EventStatus::UnrecognizedEvent,
        };
        event.complete(status);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}
