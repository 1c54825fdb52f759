use crate::config::DEFAULT_SAMPLE_RATE;
use crate::parameter::{Direction, ParameterDescriptor, PreProcessor};
use crate::plugin::InternalPlugin;
use crate::processor::Processor;
use crate::smooth::ValueSmootherRamp;
use crate::types::ObjectId;
use crate::{internal_plugin_delegates, ProcessorError, ProcessorResult, RtEvent, SampleBuffer};
use std::time::Duration;

pub const GAIN_NAME: &str = "conductor.gain";

const GAIN_SMOOTHING_TIME: Duration = Duration::from_millis(20);

/// Gain in dB, smoothed per sample, with a crossfade on bypass.
#[derive(Debug)]
pub struct GainPlugin {
    plugin: InternalPlugin,
    gain_id: ObjectId,
    gain_smoother: ValueSmootherRamp,
}

impl GainPlugin {
    pub fn new() -> ProcessorResult<Self> {
        let mut plugin = InternalPlugin::new(GAIN_NAME, "Gain");
        let gain = ParameterDescriptor::float("gain", "Gain", "dB", -120.0, 24.0, Direction::Automatable)
            .with_pre_processor(PreProcessor::DbToLinear);
        let gain_id = plugin
            .register_parameter_with_default(gain, 0.0)
            .ok_or(ProcessorError::ParameterError)?;
        Ok(Self {
            plugin,
            gain_id,
            gain_smoother: ValueSmootherRamp::new(GAIN_SMOOTHING_TIME, DEFAULT_SAMPLE_RATE, 1.0),
        })
    }

    pub fn gain_parameter_id(&self) -> ObjectId {
        self.gain_id
    }

    fn linear_gain(&self) -> f32 {
        self.plugin
            .value(self.gain_id)
            .map_or(1.0, |v| v.processed_value())
    }

    fn apply_gain(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) {
        let base = self.plugin.base();
        base.bypass_process(input, output);
        let channels = base.output_channels();

        let target = self.linear_gain();
        self.gain_smoother.set(target);
        if self.gain_smoother.stationary() {
            output.apply_gain(self.gain_smoother.value());
            return;
        }
        for frame in 0..output.frames() {
            let gain = self.gain_smoother.next_value();
            for c in 0..channels {
                output.channel_mut(c)[frame] *= gain;
            }
        }
    }
}

impl Processor for GainPlugin {
    internal_plugin_delegates!(plugin);

    fn init(&mut self, sample_rate: f32) -> ProcessorResult<()> {
        if sample_rate <= 0.0 {
            return Err(ProcessorError::PluginInitError);
        }
        self.configure(sample_rate);
        Ok(())
    }

    fn configure(&mut self, sample_rate: f32) {
        self.plugin.set_sample_rate(sample_rate);
        self.gain_smoother = ValueSmootherRamp::new(GAIN_SMOOTHING_TIME, sample_rate, self.linear_gain());
    }

    fn process_event(&mut self, event: RtEvent) {
        self.plugin.process_event(event);
    }

    fn process_audio(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) {
        if !self.plugin.bypass_manager().should_process() {
            self.plugin.base().bypass_process(input, output);
            return;
        }
        self.apply_gain(input, output);

        if self.plugin.bypass_manager().should_ramp() {
            let inputs = self.plugin.base().input_channels();
            let outputs = self.plugin.base().output_channels();
            self.plugin
                .bypass_manager_mut()
                .crossfade_output(input, output, inputs, outputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mono_gain() -> GainPlugin {
        let mut plugin = GainPlugin::new().unwrap();
        plugin.init(48000.0).unwrap();
        plugin.set_input_channels(1);
        plugin.set_output_channels(1);
        plugin
    }

    #[test]
    fn test_identity() {
        let plugin = GainPlugin::new().unwrap();
        assert_eq!(plugin.gain_parameter_id(), 0);
        assert_eq!(plugin.name(), GAIN_NAME);
        assert_eq!(plugin.label(), "Gain");
        assert_eq!(
            plugin.parameter_from_name("gain").map(|p| p.id()),
            Some(plugin.gain_parameter_id())
        );
        assert_eq!(plugin.parameter_value_formatted(0).unwrap(), "0.00");
    }

    #[test]
    fn test_unity_gain() {
        let mut plugin = mono_gain();
        let input = SampleBuffer::from_channels(&[&[1.0; 64]]);
        let mut output = SampleBuffer::new(1, 64);
        plugin.process_audio(&input, &mut output);
        assert_eq!(output, input);
    }

    #[test]
    fn test_six_db_doubles() {
        let mut plugin = mono_gain();
        let id = plugin.gain_parameter_id();
        let normalized = plugin.base().parameter_from_id(id).unwrap().to_normalized(6.0);
        plugin.process_event(RtEvent::parameter_change(plugin.id(), 0, id, normalized));

        let input = SampleBuffer::from_channels(&[&[1.0; 64]]);
        let mut output = SampleBuffer::new(1, 64);
        // Let the smoother settle (20ms at 48kHz is 960 samples).
        for _ in 0..16 {
            plugin.process_audio(&input, &mut output);
        }
        for sample in output.channel(0) {
            assert_abs_diff_eq!(*sample, 1.9953, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_gain_change_is_smoothed() {
        let mut plugin = mono_gain();
        let id = plugin.gain_parameter_id();
        plugin.process_event(RtEvent::parameter_change(plugin.id(), 0, id, 0.0));

        let input = SampleBuffer::from_channels(&[&[1.0; 64]]);
        let mut output = SampleBuffer::new(1, 64);
        plugin.process_audio(&input, &mut output);
        let samples = output.channel(0);
        assert!(samples[0] < 1.0 && samples[0] > 0.9);
        assert!(samples.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_bypass_crossfade_ends_dry() {
        let mut plugin = mono_gain();
        let id = plugin.gain_parameter_id();
        plugin.set_bypassed(true);
        assert!(plugin.bypassed());
        // Offline bypass is immediate; re-enable and bypass again through the event path.
        plugin.process_event(RtEvent::set_bypass(plugin.id(), 0, false));
        plugin.process_event(RtEvent::parameter_change(plugin.id(), 0, id, 0.0));

        let input = SampleBuffer::from_channels(&[&[0.5; 64]]);
        let mut output = SampleBuffer::new(1, 64);
        for _ in 0..64 {
            plugin.process_audio(&input, &mut output);
        }
        assert!(output.peak() < 1e-3);

        plugin.process_event(RtEvent::set_bypass(plugin.id(), 0, true));
        for _ in 0..16 {
            plugin.process_audio(&input, &mut output);
        }
        assert!(!plugin.plugin.bypass_manager().should_ramp());
        assert_eq!(output, input);
    }
}
