//! The assembled host: event dispatcher plus MIDI router.

use crate::{HostBuilder, Result};
use conductor_core::{
    EngineConfig, EngineHandler, Event, EventDispatcher, EventSink, ProcessorContainer,
    RtEventConsumer, RtEventProducer, Time,
};
use conductor_midi::{MidiDispatcher, MidiFrontend};
use parking_lot::Mutex;
use std::sync::Arc;

/// The audio thread's ends of the realtime FIFOs.
pub struct AudioQueues {
    /// Events to apply at the start of each chunk.
    pub events: RtEventConsumer,
    /// Events produced while processing, read by the dispatcher.
    pub output: RtEventProducer,
}

/// Owns the dispatcher and the MIDI router and keeps them connected.
///
/// The audio callback takes its queues once through
/// [`take_audio_queues`](Self::take_audio_queues). Dropping the host stops
/// both dispatcher threads.
pub struct Host {
    config: EngineConfig,
    dispatcher: Arc<EventDispatcher>,
    midi: Arc<MidiDispatcher>,
    audio: Mutex<Option<AudioQueues>>,
}

impl Host {
    pub fn builder(container: Arc<dyn ProcessorContainer>) -> HostBuilder {
        HostBuilder::new(container)
    }

    pub(crate) fn from_parts(
        config: EngineConfig,
        container: Arc<dyn ProcessorContainer>,
        frontend: Option<Arc<dyn MidiFrontend>>,
        engine_handler: Option<Arc<dyn EngineHandler>>,
    ) -> Result<Self> {
        let (dispatcher, events, output) = EventDispatcher::with_rt_queues(&config);
        let dispatcher = Arc::new(dispatcher);
        if let Some(handler) = engine_handler {
            dispatcher.set_engine_handler(handler);
        }

        let sink: Arc<dyn EventSink> = dispatcher.clone();
        let midi = Arc::new(MidiDispatcher::new(&config, sink, container));
        if let Some(frontend) = frontend {
            midi.set_frontend(frontend);
        }
        midi.attach(&dispatcher)?;

        Ok(Self {
            config,
            dispatcher,
            midi,
            audio: Mutex::new(Some(AudioQueues { events, output })),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn midi(&self) -> &Arc<MidiDispatcher> {
        &self.midi
    }

    /// Returns `None` after the first call.
    pub fn take_audio_queues(&self) -> Option<AudioQueues> {
        self.audio.lock().take()
    }

    pub fn post_event(&self, event: Event) {
        self.dispatcher.post_event(event);
    }

    /// MIDI ingress, for frontends that hold the host rather than the router.
    pub fn send_midi(&self, input: usize, data: &[u8], timestamp: Time) {
        self.midi.send_midi(input, data, timestamp);
    }

    /// Starts the dispatcher and worker threads.
    pub fn run(&self) -> Result<()> {
        self.dispatcher.run()?;
        tracing::info!("Host running at {} Hz", self.config.sample_rate);
        Ok(())
    }

    pub fn stop(&self) {
        self.dispatcher.stop();
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.dispatcher.stop();
        self.midi.detach(&self.dispatcher);
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("dispatcher", &self.dispatcher)
            .field("midi", &self.midi)
            .finish_non_exhaustive()
    }
}
