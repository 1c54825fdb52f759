use crate::plugin::InternalPlugin;
use crate::processor::Processor;
use crate::{internal_plugin_delegates, RtEvent, SampleBuffer};

pub const PASSTHROUGH_NAME: &str = "conductor.passthrough";

/// Copies audio unchanged and forwards keyboard events.
#[derive(Debug)]
pub struct PassthroughPlugin {
    plugin: InternalPlugin,
}

impl PassthroughPlugin {
    pub fn new() -> Self {
        Self {
            plugin: InternalPlugin::new(PASSTHROUGH_NAME, "Passthrough"),
        }
    }
}

impl Default for PassthroughPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Processor for PassthroughPlugin {
    internal_plugin_delegates!(plugin);

    fn init(&mut self, sample_rate: f32) -> crate::ProcessorResult<()> {
        self.plugin.set_sample_rate(sample_rate);
        Ok(())
    }

    fn process_event(&mut self, event: RtEvent) {
        self.plugin.process_event(event);
    }

    fn process_audio(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) {
        self.plugin.base().bypass_process(input, output);
    }
}
