//! Parameter storage and default event handling for built-in processors.
//!
//! [`InternalPlugin`] owns the parameter values, string properties and bypass
//! state of a processor written against this crate. Concrete processors embed
//! one and forward the bookkeeping parts of [`Processor`](crate::Processor)
//! with [`internal_plugin_delegates!`](crate::internal_plugin_delegates).
//!
//! # Example
//!
//! ```
//! use conductor_core::{
//!     internal_plugin_delegates, InternalPlugin, Processor, RtEvent, SampleBuffer,
//! };
//!
//! struct Mute {
//!     plugin: InternalPlugin,
//!     muted: u32,
//! }
//!
//! impl Processor for Mute {
//!     internal_plugin_delegates!(plugin);
//!
//!     fn process_event(&mut self, event: RtEvent) {
//!         self.plugin.process_event(event);
//!     }
//!
//!     fn process_audio(&mut self, _input: &SampleBuffer, output: &mut SampleBuffer) {
//!         if self.plugin.value(self.muted).is_some_and(|v| v.bool_value()) {
//!             output.clear();
//!         }
//!     }
//! }
//!
//! let mut plugin = InternalPlugin::new("mute", "Mute");
//! let muted = plugin.register_bool_parameter("muted", "Muted", "", false).unwrap();
//! let mute = Mute { plugin, muted };
//! assert_eq!(mute.parameter_value_formatted(muted).unwrap(), "False");
//! ```

use crate::bypass::BypassManager;
use crate::config::DEFAULT_SAMPLE_RATE;
use crate::error::{ProcessorError, ProcessorResult};
use crate::event::{
    AudioGraphAction, EngineNotification, Event, EventKind, PropertyChangeNotification, RtEvent,
    RtEventKind,
};
use crate::handoff::Handoff;
use crate::parameter::{Direction, ParameterDescriptor, ParameterType, ParameterValue};
use crate::processor::ProcessorBase;
use crate::state::{ProcessorState, RtState};
use crate::types::ObjectId;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_CHANNELS: usize = 2;

pub struct InternalPlugin {
    base: ProcessorBase,
    /// Indexed by parameter id. Properties hold a placeholder so ids and
    /// indices stay aligned.
    values: Arc<Vec<ParameterValue>>,
    properties: Mutex<BTreeMap<ObjectId, String>>,
    bypass_manager: BypassManager,
    sample_rate: f32,
}

impl InternalPlugin {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        let mut base = ProcessorBase::new(name, label);
        base.set_max_channels(DEFAULT_CHANNELS, DEFAULT_CHANNELS);
        Self {
            base,
            values: Arc::new(Vec::new()),
            properties: Mutex::new(BTreeMap::new()),
            bypass_manager: BypassManager::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn with_bypass_manager(mut self, bypass_manager: BypassManager) -> Self {
        self.bypass_manager = bypass_manager;
        self
    }

    #[inline]
    pub fn base(&self) -> &ProcessorBase {
        &self.base
    }

    #[inline]
    pub fn base_mut(&mut self) -> &mut ProcessorBase {
        &mut self.base
    }

    #[inline]
    pub fn bypass_manager(&self) -> &BypassManager {
        &self.bypass_manager
    }

    #[inline]
    pub fn bypass_manager_mut(&mut self) -> &mut BypassManager {
        &mut self.bypass_manager
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    // Registration. Non-realtime only, before the processor is shared.

    /// Registers `descriptor` with a default value in its domain. Returns the
    /// new parameter id, or `None` if the name is taken.
    pub fn register_parameter_with_default(
        &mut self,
        descriptor: ParameterDescriptor,
        default_value: f32,
    ) -> Option<ObjectId> {
        if !self.base.register_parameter(descriptor) {
            return None;
        }
        let descriptor = self.base.all_parameters().last()?;
        let id = descriptor.id();
        debug_assert_eq!(id as usize, self.values.len());
        let value = ParameterValue::new(descriptor, default_value);
        Arc::make_mut(&mut self.values).push(value);
        Some(id)
    }

    pub fn register_float_parameter(
        &mut self,
        name: &str,
        label: &str,
        unit: &str,
        default_value: f32,
        min_value: f32,
        max_value: f32,
    ) -> Option<ObjectId> {
        let descriptor = ParameterDescriptor::float(name, label, unit, min_value, max_value, Direction::Automatable);
        self.register_parameter_with_default(descriptor, default_value)
    }

    pub fn register_int_parameter(
        &mut self,
        name: &str,
        label: &str,
        unit: &str,
        default_value: i32,
        min_value: i32,
        max_value: i32,
    ) -> Option<ObjectId> {
        let descriptor = ParameterDescriptor::int(name, label, unit, min_value, max_value, Direction::Automatable);
        self.register_parameter_with_default(descriptor, default_value as f32)
    }

    pub fn register_bool_parameter(
        &mut self,
        name: &str,
        label: &str,
        unit: &str,
        default_value: bool,
    ) -> Option<ObjectId> {
        let descriptor = ParameterDescriptor::bool(name, label, unit, Direction::Automatable);
        self.register_parameter_with_default(descriptor, if default_value { 1.0 } else { 0.0 })
    }

    pub fn register_property(&mut self, name: &str, label: &str, default_value: &str) -> Option<ObjectId> {
        let id = self.register_parameter_with_default(ParameterDescriptor::string_property(name, label), 0.0)?;
        self.properties.lock().insert(id, default_value.to_string());
        Some(id)
    }

    /// Value storage for `parameter_id`. Properties have none.
    #[inline]
    pub fn value(&self, parameter_id: ObjectId) -> Option<&ParameterValue> {
        self.values
            .get(parameter_id as usize)
            .filter(|v| is_numeric(v.parameter_type()))
    }

    /// A handle for reading values from other threads. Take it after all
    /// parameters are registered.
    pub fn shared_values(&self) -> Arc<Vec<ParameterValue>> {
        Arc::clone(&self.values)
    }

    // Realtime

    /// Default handling: keyboard events pass through, parameter changes are
    /// stored, state, bypass and property changes are applied and their
    /// payloads handed back for release.
    pub fn process_event(&mut self, event: RtEvent) {
        match *event.kind() {
            _ if event.is_keyboard_event() => self.base.output_event(event),
            RtEventKind::FloatParameterChange { parameter_id, value }
            | RtEventKind::IntParameterChange { parameter_id, value }
            | RtEventKind::BoolParameterChange { parameter_id, value } => {
                if let Some(storage) = self.value(parameter_id) {
                    storage.set(value);
                }
            }
            RtEventKind::SetBypass(bypassed) => {
                self.bypass_manager.set_bypass(bypassed, self.sample_rate);
                self.base.set_bypassed(bypassed);
            }
            RtEventKind::SetState(handle) => {
                let values = &self.values;
                let bypass = self
                    .base
                    .host_control()
                    .and_then(|host| {
                        host.handoff().with(handle, |payload| match payload {
                            Handoff::State(state) => apply_rt_state(values, state),
                            _ => None,
                        })
                    })
                    .flatten();
                if let Some(bypassed) = bypass {
                    self.bypass_manager.set_bypass(bypassed, self.sample_rate);
                    self.base.set_bypassed(bypassed);
                }
                self.base.notify_state_change_rt();
                self.base.async_delete(handle);
            }
            RtEventKind::StringPropertyChange { handle, .. }
            | RtEventKind::DataPropertyChange { handle, .. } => {
                self.base.async_delete(handle);
            }
            _ => {}
        }
    }

    /// Sets a value from inside the processor and reports it, either on the
    /// CV output the parameter is routed to or as a parameter change.
    pub fn set_parameter_and_notify(&mut self, parameter_id: ObjectId, normalized: f32) {
        let Some(storage) = self.value(parameter_id) else {
            return;
        };
        storage.set(normalized);
        let normalized = storage.normalized_value();
        let is_float = storage.parameter_type() == ParameterType::Float;
        let routed = is_float && self.base.maybe_output_cv_value(parameter_id, normalized);
        if !routed {
            let id = self.base.id();
            self.base
                .output_event(RtEvent::parameter_change(id, 0, parameter_id, normalized));
        }
    }

    // Non-realtime

    pub fn parameter_value(&self, parameter_id: ObjectId) -> ProcessorResult<f32> {
        self.numeric_value(parameter_id).map(|v| v.normalized_value())
    }

    pub fn parameter_value_in_domain(&self, parameter_id: ObjectId) -> ProcessorResult<f32> {
        self.numeric_value(parameter_id).map(|v| v.domain_value())
    }

    pub fn parameter_value_formatted(&self, parameter_id: ObjectId) -> ProcessorResult<String> {
        self.numeric_value(parameter_id).map(|v| v.formatted_value())
    }

    fn numeric_value(&self, parameter_id: ObjectId) -> ProcessorResult<&ParameterValue> {
        let storage = self
            .values
            .get(parameter_id as usize)
            .ok_or(ProcessorError::ParameterNotFound)?;
        if is_numeric(storage.parameter_type()) {
            Ok(storage)
        } else {
            Err(ProcessorError::ParameterError)
        }
    }

    pub fn property_value(&self, property_id: ObjectId) -> ProcessorResult<String> {
        self.properties
            .lock()
            .get(&property_id)
            .cloned()
            .ok_or(ProcessorError::ParameterNotFound)
    }

    pub fn set_property_value(&self, property_id: ObjectId, value: &str) -> ProcessorResult<()> {
        {
            let mut properties = self.properties.lock();
            let slot = properties
                .get_mut(&property_id)
                .ok_or(ProcessorError::ParameterNotFound)?;
            *slot = value.to_string();
        }
        if let Some(host) = self.base.host_control() {
            host.post_event(Event::immediate(EventKind::PropertyChangeNotification(
                PropertyChangeNotification {
                    processor_id: self.base.id(),
                    property_id,
                    value: value.to_string(),
                },
            )));
        }
        Ok(())
    }

    /// Bypass goes through the audio thread when a host is attached so that
    /// it never changes mid-chunk.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        match self.base.host_control() {
            Some(host) => host.post_event(Event::immediate(EventKind::SetProcessorBypass {
                processor_id: self.base.id(),
                bypassed,
            })),
            None => {
                self.bypass_manager.set_bypass_immediately(bypassed);
                self.base.set_bypassed(bypassed);
            }
        }
    }

    pub fn bypassed(&self) -> bool {
        self.base.bypassed()
    }

    pub fn save_state(&self) -> ProcessorState {
        let mut state = ProcessorState::new();
        state.set_bypass(self.bypassed());
        for (&id, value) in self.properties.lock().iter() {
            state.add_property_change(id, value.as_str());
        }
        for (id, value) in self.values.iter().enumerate() {
            if is_numeric(value.parameter_type()) {
                state.add_parameter_change(id as ObjectId, value.normalized_value());
            }
        }
        state
    }

    pub fn set_state(&mut self, state: &ProcessorState, realtime_running: bool) -> ProcessorResult<()> {
        for (id, value) in state.properties() {
            if let Err(e) = self.set_property_value(*id, value) {
                tracing::warn!("Processor {}: property {} not restored: {}", self.base.name(), id, e);
            }
        }

        if realtime_running {
            let host = self.base.host_control().ok_or(ProcessorError::Error)?;
            host.post_event(Event::immediate(EventKind::RtStateChange {
                processor_id: self.base.id(),
                state: RtState::from(state),
            }));
            return Ok(());
        }

        if let Some(bypassed) = state.bypassed() {
            self.bypass_manager.set_bypass_immediately(bypassed);
            self.base.set_bypassed(bypassed);
        }
        for &(id, value) in state.parameters() {
            if let Some(storage) = self.value(id) {
                storage.set(value);
            }
        }
        if let Some(host) = self.base.host_control() {
            host.post_event(Event::immediate(EventKind::EngineNotification(
                EngineNotification::AudioGraph {
                    action: AudioGraphAction::ProcessorUpdated,
                    processor_id: self.base.id(),
                    track_id: 0,
                },
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for InternalPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalPlugin")
            .field("base", &self.base)
            .field("bypass", &self.bypass_manager.state())
            .finish()
    }
}

#[inline]
fn is_numeric(parameter_type: ParameterType) -> bool {
    matches!(
        parameter_type,
        ParameterType::Float | ParameterType::Int | ParameterType::Bool
    )
}

/// Writes the parameters of `state` and returns its bypass flag.
fn apply_rt_state(values: &[ParameterValue], state: &RtState) -> Option<bool> {
    for &(id, value) in state.parameters() {
        if let Some(storage) = values.get(id as usize) {
            if is_numeric(storage.parameter_type()) {
                storage.set(value);
            }
        }
    }
    state.bypassed()
}

/// Implements the bookkeeping methods of [`Processor`](crate::Processor) by
/// forwarding to an embedded [`InternalPlugin`] field.
///
/// # Example
/// ```ignore
/// impl Processor for MyPlugin {
///     internal_plugin_delegates!(plugin);
///     fn process_event(&mut self, event: RtEvent) { self.plugin.process_event(event) }
///     fn process_audio(&mut self, input: &SampleBuffer, output: &mut SampleBuffer) { .. }
/// }
/// ```
#[macro_export]
macro_rules! internal_plugin_delegates {
    ($field:ident) => {
        fn base(&self) -> &$crate::ProcessorBase {
            self.$field.base()
        }

        fn base_mut(&mut self) -> &mut $crate::ProcessorBase {
            self.$field.base_mut()
        }

        fn set_bypassed(&mut self, bypassed: bool) {
            self.$field.set_bypassed(bypassed)
        }

        fn parameter_value(&self, parameter_id: $crate::ObjectId) -> $crate::ProcessorResult<f32> {
            self.$field.parameter_value(parameter_id)
        }

        fn parameter_value_in_domain(
            &self,
            parameter_id: $crate::ObjectId,
        ) -> $crate::ProcessorResult<f32> {
            self.$field.parameter_value_in_domain(parameter_id)
        }

        fn parameter_value_formatted(
            &self,
            parameter_id: $crate::ObjectId,
        ) -> $crate::ProcessorResult<String> {
            self.$field.parameter_value_formatted(parameter_id)
        }

        fn property_value(&self, property_id: $crate::ObjectId) -> $crate::ProcessorResult<String> {
            self.$field.property_value(property_id)
        }

        fn set_property_value(
            &self,
            property_id: $crate::ObjectId,
            value: &str,
        ) -> $crate::ProcessorResult<()> {
            self.$field.set_property_value(property_id, value)
        }

        fn save_state(&self) -> $crate::ProcessorState {
            self.$field.save_state()
        }

        fn set_state(
            &mut self,
            state: &$crate::ProcessorState,
            realtime_running: bool,
        ) -> $crate::ProcessorResult<()> {
            self.$field.set_state(state, realtime_running)
        }
    };
}
