//! Parameter descriptors and realtime-safe value storage.
//!
//! Values are stored normalized (0.0-1.0) and mapped linearly onto the
//! descriptor's domain range. An optional [`PreProcessor`] then converts the
//! domain value into what the processor actually uses, e.g. dB to linear gain.
//!
//! # Example
//!
//! ```
//! use conductor_core::{ParameterDescriptor, ParameterValue, PreProcessor, Direction};
//!
//! // Gain: -60dB to +12dB, processor works with linear gain
//! let desc = ParameterDescriptor::float("gain", "Gain", "dB", -60.0, 12.0, Direction::Automatable)
//!     .with_pre_processor(PreProcessor::DbToLinear);
//! let value = ParameterValue::new(&desc, 0.0);
//!
//! assert_eq!(value.domain_value(), 0.0);
//! assert!((value.processed_value() - 1.0).abs() < 1e-6);
//! ```

use crate::lockfree::AtomicFloat;
use crate::types::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    Float,
    Int,
    Bool,
    String,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Set from the outside, e.g. by a control surface or MIDI CC.
    #[default]
    Automatable,
    /// Written by the processor itself, e.g. a meter.
    Output,
}

/// Conversion applied between the domain value and the value a processor uses.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PreProcessor {
    #[default]
    Linear,
    /// `processed = 10^(domain / 20)`
    DbToLinear,
    /// `processed = 20 * log10(domain)`
    LinearToDb,
}

impl PreProcessor {
    #[inline]
    pub fn process_to_plugin(self, value: f32) -> f32 {
        match self {
            PreProcessor::Linear => value,
            PreProcessor::DbToLinear => 10.0f32.powf(value / 20.0),
            PreProcessor::LinearToDb => 20.0 * value.log10(),
        }
    }

    /// Identity for all built-in variants: the domain value is what users see.
    #[inline]
    pub fn process_from_plugin(self, value: f32) -> f32 {
        value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    id: ObjectId,
    name: String,
    label: String,
    unit: String,
    parameter_type: ParameterType,
    direction: Direction,
    min_domain_value: f32,
    max_domain_value: f32,
    pre_processor: PreProcessor,
}

impl ParameterDescriptor {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        parameter_type: ParameterType,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            label: label.into(),
            unit: unit.into(),
            parameter_type,
            direction: Direction::Automatable,
            min_domain_value: 0.0,
            max_domain_value: 1.0,
            pre_processor: PreProcessor::Linear,
        }
    }

    pub fn float(
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        min: f32,
        max: f32,
        direction: Direction,
    ) -> Self {
        Self::new(name, label, unit, ParameterType::Float)
            .with_range(min, max)
            .with_direction(direction)
    }

    pub fn int(
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        min: i32,
        max: i32,
        direction: Direction,
    ) -> Self {
        Self::new(name, label, unit, ParameterType::Int)
            .with_range(min as f32, max as f32)
            .with_direction(direction)
    }

    pub fn bool(
        name: impl Into<String>,
        label: impl Into<String>,
        unit: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self::new(name, label, unit, ParameterType::Bool).with_direction(direction)
    }

    pub fn string_property(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, "", ParameterType::String)
    }

    pub fn with_range(mut self, min: f32, max: f32) -> Self {
        debug_assert!(max >= min, "max must not be below min");
        self.min_domain_value = min;
        self.max_domain_value = max;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_pre_processor(mut self, pre_processor: PreProcessor) -> Self {
        self.pre_processor = pre_processor;
        self
    }

    /// Ids are assigned when the descriptor is registered with a processor.
    pub(crate) fn set_id(&mut self, id: ObjectId) {
        self.id = id;
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    #[inline]
    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    pub fn automatable(&self) -> bool {
        self.direction == Direction::Automatable
    }

    pub fn min_domain_value(&self) -> f32 {
        self.min_domain_value
    }

    pub fn max_domain_value(&self) -> f32 {
        self.max_domain_value
    }

    pub fn pre_processor(&self) -> PreProcessor {
        self.pre_processor
    }

    /// `domain = min + normalized * (max - min)`
    #[inline]
    pub fn to_domain(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        self.min_domain_value + normalized * (self.max_domain_value - self.min_domain_value)
    }

    #[inline]
    pub fn to_normalized(&self, domain: f32) -> f32 {
        let range = self.max_domain_value - self.min_domain_value;
        if range <= 0.0 {
            return 0.0;
        }
        ((domain - self.min_domain_value) / range).clamp(0.0, 1.0)
    }
}

/// Current value of one parameter.
///
/// Written on the audio thread, readable from any thread.
#[derive(Debug, Clone)]
pub struct ParameterValue {
    parameter_type: ParameterType,
    descriptor_min: f32,
    descriptor_max: f32,
    pre_processor: PreProcessor,
    normalized: AtomicFloat,
    processed: AtomicFloat,
}

impl ParameterValue {
    /// `default_value` is in the domain range.
    pub fn new(descriptor: &ParameterDescriptor, default_value: f32) -> Self {
        let value = Self {
            parameter_type: descriptor.parameter_type(),
            descriptor_min: descriptor.min_domain_value(),
            descriptor_max: descriptor.max_domain_value(),
            pre_processor: descriptor.pre_processor(),
            normalized: AtomicFloat::new(0.0),
            processed: AtomicFloat::new(0.0),
        };
        match value.parameter_type {
            ParameterType::Bool => value.set(if default_value > 0.5 { 1.0 } else { 0.0 }),
            _ => value.set(value.to_normalized(default_value)),
        }
        value
    }

    #[inline]
    fn to_domain(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        self.descriptor_min + normalized * (self.descriptor_max - self.descriptor_min)
    }

    #[inline]
    fn to_normalized(&self, domain: f32) -> f32 {
        let range = self.descriptor_max - self.descriptor_min;
        if range <= 0.0 {
            return 0.0;
        }
        ((domain - self.descriptor_min) / range).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn parameter_type(&self) -> ParameterType {
        self.parameter_type
    }

    /// Sets from a normalized value. Realtime safe.
    #[inline]
    pub fn set(&self, normalized: f32) {
        match self.parameter_type {
            ParameterType::Bool => {
                let on = normalized > 0.5;
                self.normalized.set(if on { 1.0 } else { 0.0 });
                self.processed.set(if on { 1.0 } else { 0.0 });
            }
            ParameterType::Int => {
                let normalized = normalized.clamp(0.0, 1.0);
                self.normalized.set(normalized);
                self.processed.set(self.to_domain(normalized).round());
            }
            _ => {
                let normalized = normalized.clamp(0.0, 1.0);
                self.normalized.set(normalized);
                self.processed
                    .set(self.pre_processor.process_to_plugin(self.to_domain(normalized)));
            }
        }
    }

    /// Sets from a domain value.
    pub fn set_domain(&self, domain: f32) {
        self.set(self.to_normalized(domain));
    }

    #[inline]
    pub fn normalized_value(&self) -> f32 {
        self.normalized.get()
    }

    /// The value the processor works with, after pre-processing.
    #[inline]
    pub fn processed_value(&self) -> f32 {
        self.processed.get()
    }

    #[inline]
    pub fn bool_value(&self) -> bool {
        self.normalized.get() > 0.5
    }

    #[inline]
    pub fn int_value(&self) -> i32 {
        self.processed.get() as i32
    }

    pub fn domain_value(&self) -> f32 {
        match self.parameter_type {
            ParameterType::Bool => self.normalized.get(),
            ParameterType::Int => self.to_domain(self.normalized.get()).round(),
            _ => self
                .pre_processor
                .process_from_plugin(self.to_domain(self.normalized.get())),
        }
    }

    pub fn formatted_value(&self) -> String {
        match self.parameter_type {
            ParameterType::Bool => {
                if self.bool_value() {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            ParameterType::Int => format!("{}", self.domain_value() as i32),
            _ => format!("{:.2}", self.domain_value()),
        }
    }
}
