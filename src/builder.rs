//! Builder for configuring and constructing a [`Host`].

use crate::{Host, Result};
use conductor_core::{EngineConfig, EngineHandler, ProcessorContainer};
use conductor_midi::MidiFrontend;
use std::sync::Arc;
use std::time::Duration;

/// The processor container is the only required collaborator: the MIDI
/// router resolves processor, parameter and track names through it.
///
/// # Example
///
/// ```ignore
/// let host = Host::builder(engine.clone())
///     .sample_rate(44100.0)
///     .midi_ports(2, 1)
///     .midi_frontend(alsa)
///     .build()?;
/// host.run()?;
/// ```
pub struct HostBuilder {
    config: EngineConfig,
    container: Arc<dyn ProcessorContainer>,
    frontend: Option<Arc<dyn MidiFrontend>>,
    engine_handler: Option<Arc<dyn EngineHandler>>,
}

impl HostBuilder {
    pub fn new(container: Arc<dyn ProcessorContainer>) -> Self {
        Self {
            config: EngineConfig::default(),
            container,
            frontend: None,
            engine_handler: None,
        }
    }

    /// Replaces the whole configuration. Later setters still apply on top.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 48000
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 64
    pub fn chunk_size(mut self, frames: usize) -> Self {
        self.config.audio_chunk_size = frames;
        self
    }

    /// Default: 10 ms
    pub fn bypass_ramp_time(mut self, ramp: Duration) -> Self {
        self.config.bypass_ramp_time = ramp;
        self
    }

    /// Default: 1 input, 1 output
    pub fn midi_ports(mut self, inputs: usize, outputs: usize) -> Self {
        self.config.midi_inputs = inputs;
        self.config.midi_outputs = outputs;
        self
    }

    pub fn midi_frontend(mut self, frontend: Arc<dyn MidiFrontend>) -> Self {
        self.frontend = Some(frontend);
        self
    }

    /// Receives program changes from the worker thread.
    pub fn engine_handler(mut self, handler: Arc<dyn EngineHandler>) -> Self {
        self.engine_handler = Some(handler);
        self
    }

    /// Validates the configuration and wires the MIDI router into the event
    /// dispatcher. No threads are started until [`Host::run`].
    pub fn build(self) -> Result<Host> {
        self.config.validate()?;
        tracing::debug!(
            "Building host: {} Hz, {} frames, {} MIDI in, {} MIDI out",
            self.config.sample_rate,
            self.config.audio_chunk_size,
            self.config.midi_inputs,
            self.config.midi_outputs
        );
        Host::from_parts(self.config, self.container, self.frontend, self.engine_handler)
    }
}
